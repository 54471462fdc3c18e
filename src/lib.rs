//! A time-windowed, single-choice election tally.
//!
//! An [`ElectionTally`] holds a fixed slate of candidates and a voting window.
//! Each voter may vote once while the window is open; once it has closed the
//! winners are resolved, with ties producing several winners.

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate tally_test;

pub mod clock;
pub mod error;
pub mod logging;
pub mod model;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result, SpecError};
pub use logging::LogSink;
pub use model::{
    ballot::{Ballot, VoterId},
    candidate::Candidate,
    election::{
        CandidateIndex, CandidateSpec, ElectionMetadata, ElectionPhase, ElectionSpec,
        ElectionTally,
    },
    event::{EventSink, NullSink, RecordingSink, TallyEvent},
    status::ElectionStatus,
};
