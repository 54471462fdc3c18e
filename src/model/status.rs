use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Snapshot of how an election currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionStatus {
    /// Votes held by the leading candidate.
    pub leading_votes: u64,
    /// Votes cast across all candidates.
    pub total_votes: u64,
    /// Election title.
    pub title: String,
    /// Party label of the leading candidate.
    pub leading_party: String,
    /// Name of the leading candidate.
    pub leading_name: String,
}

impl Display for ElectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} leads with {} of {} vote{}",
            self.title,
            self.leading_party,
            self.leading_votes,
            self.total_votes,
            if self.total_votes != 1 { "s" } else { "" }
        )
    }
}
