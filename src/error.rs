use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ballot::VoterId;
use crate::model::election::CandidateIndex;

pub type Result<T> = std::result::Result<T, Error>;

/// Rejections from an [`ElectionTally`](crate::ElectionTally).
///
/// Every rejected call leaves the tally exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Too early to call function")]
    TooEarly,
    #[error("Too late to call function")]
    TooLate,
    #[error("Voter {0} has voted already")]
    AlreadyVoted(VoterId),
    #[error("Candidate {index} does not exist (election has {count} candidates)")]
    InvalidCandidate { index: CandidateIndex, count: usize },
    #[error("Election must end after it starts (start {start}, end {end})")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("Timestamp {0} is out of range")]
    InvalidTimestamp(i64),
    #[error("Election has no candidates")]
    NoCandidates,
    #[error("Party '{0}' is registered more than once")]
    DuplicateParty(String),
}

/// Errors from loading an election specification.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("Failed to read election spec: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed election spec: {0}")]
    Format(#[from] serde_json::Error),
    #[error("Invalid election: {0}")]
    Invalid(#[from] Error),
}
