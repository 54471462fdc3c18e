use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::election::CandidateIndex;

/// Opaque voter identity. Authenticating it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoterId(String);

impl VoterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VoterId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for VoterId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for VoterId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A vote that has been counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    /// Which candidate received the vote.
    pub candidate: CandidateIndex,
    /// When the vote was accepted.
    pub cast_at: DateTime<Utc>,
}

/// Record of who has voted. Entries are only ever added.
#[derive(Debug, Clone, Default)]
pub struct BallotRegistry {
    ballots: HashMap<VoterId, Ballot>,
}

impl BallotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_voted(&self, voter: &VoterId) -> bool {
        self.ballots.contains_key(voter)
    }

    pub fn get(&self, voter: &VoterId) -> Option<&Ballot> {
        self.ballots.get(voter)
    }

    /// Number of voters who have voted.
    pub fn len(&self) -> usize {
        self.ballots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ballots.is_empty()
    }

    /// Record a ballot. Returns false, leaving the existing entry alone, if the voter already voted.
    pub(crate) fn record(&mut self, voter: VoterId, ballot: Ballot) -> bool {
        if self.ballots.contains_key(&voter) {
            return false;
        }
        self.ballots.insert(voter, ballot);
        true
    }
}
