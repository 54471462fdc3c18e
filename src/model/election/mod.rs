pub use metadata::{ElectionMetadata, ElectionPhase};
pub use spec::{CandidateSpec, ElectionSpec};
pub use tally::ElectionTally;

mod metadata;
mod spec;
mod tally;

/// Candidates are identified by their position on the slate.
pub type CandidateIndex = usize;
