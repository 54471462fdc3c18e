use log::Level;

use crate::model::event::{EventSink, TallyEvent};

/// Name of the `dynamic_level` filter in `log4rs.yaml`.
///
/// Setting this filter's level switches the whole console appender, not only
/// this crate's records.
pub const LOG_FILTER_NAME: &str = "election_tally";

/// Level at which [`LogSink`] reports events.
pub const EVENT_LEVEL: Level = Level::Info;

/// Level at which an election traces the votes and results it also hands to its sink.
pub const TALLY_LEVEL: Level = Level::Debug;

/// An event sink that writes every notification to the log.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: TallyEvent) {
        match event {
            TallyEvent::VoteCast { voter, candidate } => {
                log!(EVENT_LEVEL, "VoteCast voter={voter} candidate={candidate}")
            }
            TallyEvent::Winner { names } => {
                log!(EVENT_LEVEL, "Winner names={}", names.join(","))
            }
        }
    }
}
