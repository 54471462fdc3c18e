pub mod ballot;
pub mod candidate;
pub mod election;
pub mod event;
pub mod status;
