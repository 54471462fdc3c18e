use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A candidate on the slate, with its running vote count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Party label, unique within the slate.
    pub party: String,
    /// Candidate name.
    pub name: String,
    /// Votes received so far.
    pub votes: u64,
}

impl Candidate {
    /// Create a candidate with no votes.
    pub fn new(party: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            party: party.into(),
            name: name.into(),
            votes: 0,
        }
    }

    pub(crate) fn add_vote(&mut self) {
        self.votes += 1;
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}): {} vote{}",
            self.name,
            self.party,
            self.votes,
            if self.votes != 1 { "s" } else { "" }
        )
    }
}

/// The candidate with the strictly highest count, scanning in slate order.
///
/// Ties go to the earliest candidate, so an untouched slate reports its first entry.
pub fn leading_candidate(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut leader: Option<&Candidate> = None;
    for candidate in candidates {
        match leader {
            Some(current) if candidate.votes <= current.votes => {}
            _ => leader = Some(candidate),
        }
    }
    leader
}

/// Every candidate sharing the maximum count, in slate order.
pub fn winning_candidates(candidates: &[Candidate]) -> Vec<&Candidate> {
    let max_votes = candidates.iter().map(|c| c.votes).max().unwrap_or(0);
    candidates.iter().filter(|c| c.votes == max_votes).collect()
}
