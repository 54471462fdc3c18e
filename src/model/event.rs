use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::model::ballot::VoterId;
use crate::model::election::CandidateIndex;

/// Notifications published by an election to outside observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum TallyEvent {
    /// A vote was accepted.
    VoteCast {
        voter: VoterId,
        candidate: CandidateIndex,
    },
    /// The winners were resolved, in slate order.
    Winner { names: Vec<String> },
}

/// Receiver of [`TallyEvent`]s.
///
/// Events are delivered synchronously while the election holds its state lock,
/// so a sink must not call back into the election that owns it.
pub trait EventSink {
    fn emit(&self, event: TallyEvent);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: TallyEvent) {
        (**self).emit(event)
    }
}

/// Drops every event.
#[derive(Debug, Default, Copy, Clone)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: TallyEvent) {}
}

/// Keeps every event in memory, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TallyEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything received so far.
    pub fn events(&self) -> Vec<TallyEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return everything received so far.
    pub fn take(&self) -> Vec<TallyEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: TallyEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
