use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A view on just the election's top-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionMetadata {
    /// Election title.
    pub title: String,
    /// First instant at which votes are accepted.
    pub start_time: DateTime<Utc>,
    /// Last instant at which votes are accepted.
    pub end_time: DateTime<Utc>,
}

impl ElectionMetadata {
    /// Where the election stands at time `now`.
    pub fn phase_at(&self, now: DateTime<Utc>) -> ElectionPhase {
        if now < self.start_time {
            ElectionPhase::NotStarted
        } else if now <= self.end_time {
            ElectionPhase::Open
        } else {
            ElectionPhase::Closed
        }
    }

    /// Check that a vote may be accepted at time `now`.
    pub fn check_voting_open(&self, now: DateTime<Utc>) -> Result<()> {
        match self.phase_at(now) {
            ElectionPhase::NotStarted => Err(Error::TooEarly),
            ElectionPhase::Open => Ok(()),
            ElectionPhase::Closed => Err(Error::TooLate),
        }
    }

    /// Check that results may be announced at time `now`, i.e. the end time has been reached.
    pub fn check_ended(&self, now: DateTime<Utc>) -> Result<()> {
        if now < self.end_time {
            return Err(Error::TooEarly);
        }
        Ok(())
    }
}

/// Stages of the election lifecycle.
///
/// Never stored: always derived from the clock and the voting window.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionPhase {
    /// Before the start time. Only queries are allowed.
    NotStarted,
    /// Within the voting window, both ends inclusive. Votes are accepted.
    Open,
    /// After the end time. Votes are refused.
    Closed,
}
