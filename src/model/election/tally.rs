use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::logging::{LogSink, TALLY_LEVEL};
use crate::model::{
    ballot::{Ballot, BallotRegistry, VoterId},
    candidate::{leading_candidate, winning_candidates, Candidate},
    event::{EventSink, TallyEvent},
    status::ElectionStatus,
};

use super::{CandidateIndex, ElectionMetadata, ElectionPhase, ElectionSpec};

/// A single-choice election over a fixed slate and a fixed voting window.
///
/// All mutable state sits behind one lock: a vote either applies in full or
/// not at all, and readers only ever see whole votes.
pub struct ElectionTally<C = SystemClock, S = LogSink> {
    metadata: ElectionMetadata,
    state: Mutex<TallyState>,
    clock: C,
    sink: S,
}

/// The parts of an election that change while it runs.
#[derive(Debug)]
struct TallyState {
    candidates: Vec<Candidate>,
    ballots: BallotRegistry,
}

impl TallyState {
    /// Check every precondition, then apply the vote.
    fn cast(
        &mut self,
        metadata: &ElectionMetadata,
        voter: &VoterId,
        candidate: CandidateIndex,
        now: DateTime<Utc>,
    ) -> Result<()> {
        metadata.check_voting_open(now)?;
        if self.ballots.has_voted(voter) {
            return Err(Error::AlreadyVoted(voter.clone()));
        }
        let count = self.candidates.len();
        let entry = self
            .candidates
            .get_mut(candidate)
            .ok_or(Error::InvalidCandidate {
                index: candidate,
                count,
            })?;

        entry.add_vote();
        let recorded = self.ballots.record(
            voter.clone(),
            Ballot {
                candidate,
                cast_at: now,
            },
        );
        debug_assert!(recorded, "ballot for {voter} recorded twice");
        Ok(())
    }

    fn total_votes(&self) -> u64 {
        self.candidates.iter().map(|c| c.votes).sum()
    }
}

impl ElectionTally {
    /// Create an election running on the system clock and reporting events to the log.
    pub fn with_system_clock(spec: ElectionSpec) -> Result<Self> {
        Self::new(spec, SystemClock, LogSink)
    }
}

impl<C: Clock, S: EventSink> ElectionTally<C, S> {
    /// Create an election from its spec. Every candidate starts on zero votes.
    pub fn new(spec: ElectionSpec, clock: C, sink: S) -> Result<Self> {
        spec.validate()?;
        let (metadata, candidates) = spec.into_parts();
        info!(
            "Created election '{}' with {} candidates, open {} to {}",
            metadata.title,
            candidates.len(),
            metadata.start_time,
            metadata.end_time
        );
        Ok(Self {
            metadata,
            state: Mutex::new(TallyState {
                candidates,
                ballots: BallotRegistry::new(),
            }),
            clock,
            sink,
        })
    }

    /// Title and voting window.
    pub fn metadata(&self) -> &ElectionMetadata {
        &self.metadata
    }

    /// Where the election stands right now.
    pub fn phase(&self) -> ElectionPhase {
        self.metadata.phase_at(self.clock.now())
    }

    /// Cast `voter`'s one vote for the candidate at `candidate`.
    ///
    /// Checks, in order: the window has opened, the window has not closed,
    /// the voter has not voted, the candidate exists.
    pub fn vote(&self, voter: &VoterId, candidate: CandidateIndex) -> Result<()> {
        let now = self.clock.now();
        let mut state = self.lock();
        match state.cast(&self.metadata, voter, candidate, now) {
            Ok(()) => {
                log!(
                    TALLY_LEVEL,
                    "'{}': {voter} voted for candidate {candidate}",
                    self.metadata.title
                );
                self.sink.emit(TallyEvent::VoteCast {
                    voter: voter.clone(),
                    candidate,
                });
                Ok(())
            }
            Err(err) => {
                warn!(
                    "'{}': rejected vote by {voter} for candidate {candidate}: {err}",
                    self.metadata.title
                );
                Err(err)
            }
        }
    }

    /// The full slate with current counts, in creation order.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.lock().candidates.clone()
    }

    /// Leading candidate and total so far. Callable at any time.
    ///
    /// The leader is the earliest candidate holding the highest count, so before
    /// any vote this is the first candidate on the slate.
    pub fn current_status(&self) -> ElectionStatus {
        let state = self.lock();
        let leader = leading_candidate(&state.candidates);
        let status = ElectionStatus {
            leading_votes: leader.map(|c| c.votes).unwrap_or_default(),
            total_votes: state.total_votes(),
            title: self.metadata.title.clone(),
            leading_party: leader.map(|c| c.party.clone()).unwrap_or_default(),
            leading_name: leader.map(|c| c.name.clone()).unwrap_or_default(),
        };
        debug!("Status of '{}': {status}", self.metadata.title);
        status
    }

    /// Names of every candidate sharing the top count, in slate order.
    ///
    /// Only available once the end time has been reached. With no votes at all,
    /// every candidate is a winner.
    pub fn winner(&self) -> Result<Vec<String>> {
        let now = self.clock.now();
        let state = self.lock();
        if let Err(err) = self.metadata.check_ended(now) {
            warn!(
                "'{}': winner requested before the election ended",
                self.metadata.title
            );
            return Err(err);
        }
        let names: Vec<String> = winning_candidates(&state.candidates)
            .into_iter()
            .map(|c| c.name.clone())
            .collect();
        log!(TALLY_LEVEL, "'{}': winners {names:?}", self.metadata.title);
        self.sink.emit(TallyEvent::Winner {
            names: names.clone(),
        });
        Ok(names)
    }

    /// Has this voter already voted?
    pub fn has_voted(&self, voter: &VoterId) -> bool {
        self.lock().ballots.has_voted(voter)
    }

    /// The ballot recorded for this voter, if any.
    pub fn ballot(&self, voter: &VoterId) -> Option<Ballot> {
        self.lock().ballots.get(voter).copied()
    }

    /// Number of voters who have voted.
    pub fn voter_count(&self) -> usize {
        self.lock().ballots.len()
    }

    /// The state is only written after every check has passed, so a poisoned
    /// lock still holds a consistent tally.
    fn lock(&self) -> MutexGuard<'_, TallyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
