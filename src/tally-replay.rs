//! A simple CLI tool for replaying elections.
//! Feeds a recorded sequence of votes through the library's own tally, so the
//! results are by definition those the library would have produced live.

use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;

use chrono::{DateTime, Utc};
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;
use serde::Deserialize;

use election_tally::{
    logging::LOG_FILTER_NAME, Candidate, CandidateIndex, ElectionPhase, ElectionSpec, ElectionStatus,
    ElectionTally, Error as TallyError, LogSink, ManualClock, VoterId,
};

const PROGRAM_NAME: &str = "tally-replay";

const ABOUT_TEXT: &str = "Replay the votes of an election and report the outcome.

EXIT CODES:
     0: Replay succeeded and every vote was accepted.
   255: Replay succeeded, but some votes were rejected.
 Other: Error.";

const DUMP_PATH: &str = "DUMP_PATH";

const DUMP_PATH_HELP: &str = "The path to a JSON replay dump: an `election` spec,\n\
a list of `votes` with their timestamps, and an optional `query_at` time";

const LOG_CONFIG: &str = "log-config";

const QUIET: &str = "quiet";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .arg(
            Arg::new(DUMP_PATH)
                .help(DUMP_PATH_HELP)
                .action(ArgAction::Set)
                .required(true),
        )
        .arg(
            Arg::new(LOG_CONFIG)
                .long(LOG_CONFIG)
                .value_name("FILE")
                .help("Initialise logging from this log4rs config")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new(QUIET)
                .long(QUIET)
                .short('q')
                .help("Silence all console log output")
                .action(ArgAction::SetTrue),
        )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq)]
enum Error {
    /// IO error described by the inner message.
    IO(String),
    /// Failed to decode the JSON dump.
    Format(String),
    /// The dump describes an election that cannot exist.
    Election(TallyError),
}

/// A recorded election.
#[derive(Debug, Deserialize)]
struct ReplayDump {
    election: ElectionSpec,
    #[serde(default)]
    votes: Vec<VoteRecord>,
    /// When to take the final readings; defaults to the time of the last vote.
    #[serde(default)]
    query_at: Option<DateTime<Utc>>,
}

/// One attempted vote.
#[derive(Debug, Deserialize)]
struct VoteRecord {
    voter: VoterId,
    candidate: CandidateIndex,
    at: DateTime<Utc>,
}

/// A vote the tally refused.
#[derive(Debug, Eq, PartialEq)]
struct RejectedVote {
    pub voter: VoterId,
    pub candidate: CandidateIndex,
    pub reason: TallyError,
}

impl Display for RejectedVote {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} for candidate {}: {}",
            self.voter, self.candidate, self.reason
        )
    }
}

/// Everything we learned from the replay.
#[derive(Debug, Eq, PartialEq)]
struct ReplayReport {
    pub phase: ElectionPhase,
    pub status: ElectionStatus,
    pub candidates: Vec<Candidate>,
    pub rejected: Vec<RejectedVote>,
    /// Only present if the election had closed by the query time.
    pub winners: Option<Vec<String>>,
}

/// Run the replay.
fn replay(path: &str) -> Result<ReplayReport, Error> {
    // Load the file.
    let file = BufReader::new(File::open(path).map_err(|e| Error::IO(e.to_string()))?);
    let dump: ReplayDump =
        serde_json::from_reader(file).map_err(|e| Error::Format(e.to_string()))?;

    // Set up the election with the clock parked at its opening.
    let clock = ManualClock::new(dump.election.metadata.start_time);
    let query_at = dump
        .query_at
        .or_else(|| dump.votes.last().map(|v| v.at))
        .unwrap_or(dump.election.metadata.start_time);
    let tally = ElectionTally::new(dump.election, clock.clone(), LogSink).map_err(Error::Election)?;

    // Replay every vote at its recorded time.
    let mut rejected = Vec::new();
    for record in dump.votes {
        clock.set(record.at);
        if let Err(reason) = tally.vote(&record.voter, record.candidate) {
            rejected.push(RejectedVote {
                voter: record.voter,
                candidate: record.candidate,
                reason,
            });
        }
    }

    // Take the final readings.
    clock.set(query_at);
    let phase = tally.phase();
    let winners = match phase {
        ElectionPhase::Closed => Some(tally.winner().map_err(Error::Election)?),
        ElectionPhase::NotStarted | ElectionPhase::Open => None,
    };

    Ok(ReplayReport {
        phase,
        status: tally.current_status(),
        candidates: tally.candidates(),
        rejected,
        winners,
    })
}

/// Run the replay, report the result, and return the exit code.
fn run(args: &ArgMatches) -> u8 {
    let path: &String = args.get_one(DUMP_PATH).unwrap(); // Required argument is guaranteed to be present.
    match replay(path) {
        Ok(report) => {
            println!("{}", report.status);
            for candidate in report.candidates.iter() {
                println!("  {}", candidate);
            }
            match report.winners {
                Some(ref winners) => println!("Winners: {}", winners.join(", ")),
                None if report.phase == ElectionPhase::NotStarted => {
                    println!("Voting has not started yet.")
                }
                None => println!("Voting is still open."),
            }
            if report.rejected.is_empty() {
                0
            } else {
                println!(
                    "{} vote{} rejected:",
                    report.rejected.len(),
                    if report.rejected.len() != 1 { "s" } else { "" }
                );
                for rejection in report.rejected.iter() {
                    println!("  {}", rejection);
                }
                255
            }
        }
        Err(Error::IO(msg)) => {
            println!("IO error: {}", msg);
            1
        }
        Err(Error::Format(msg)) => {
            println!("Invalid JSON: {}", msg);
            1
        }
        Err(Error::Election(err)) => {
            println!("Invalid election: {}", err);
            1
        }
    }
}

fn main() {
    let args = cli().get_matches();

    // Set up logging if asked to.
    if let Some(config) = args.get_one::<String>(LOG_CONFIG) {
        if let Err(err) =
            log4rs::init_file(config, log4rs_dynamic_filters::default_deserializers())
        {
            println!("Failed to initialise logging: {}", err);
            std::process::exit(1);
        }
    }
    if args.get_flag(QUIET) {
        log4rs_dynamic_filters::DynamicLevelFilter::set(LOG_FILTER_NAME, LevelFilter::Off);
    }

    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(leading_votes: u64, total_votes: u64, party: &str, name: &str) -> ElectionStatus {
        ElectionStatus {
            leading_votes,
            total_votes,
            title: "ayaversity".to_string(),
            leading_party: party.to_string(),
            leading_name: name.to_string(),
        }
    }

    fn slate(votes: [u64; 3]) -> Vec<Candidate> {
        [("APC", "chris"), ("PDP", "peter"), ("LP", "doe")]
            .into_iter()
            .zip(votes)
            .map(|((party, name), votes)| Candidate {
                party: party.to_string(),
                name: name.to_string(),
                votes,
            })
            .collect()
    }

    #[test]
    fn replay_dumps() {
        // This test actually enters library code, so enable logging.
        log4rs_test_utils::test_logging::init_logging_once_for(
            ["election_tally", "tally_replay"],
            None,
            None,
        );

        assert_eq!(
            replay("example_dumps/replay_leading.json"),
            Ok(ReplayReport {
                phase: ElectionPhase::Open,
                status: status(2, 4, "LP", "doe"),
                candidates: slate([1, 1, 2]),
                rejected: vec![],
                winners: None,
            })
        );

        assert_eq!(
            replay("example_dumps/replay_winner.json"),
            Ok(ReplayReport {
                phase: ElectionPhase::Closed,
                status: status(2, 4, "PDP", "peter"),
                candidates: slate([1, 2, 1]),
                rejected: vec![],
                winners: Some(vec!["peter".to_string()]),
            })
        );

        assert_eq!(
            replay("example_dumps/replay_no_votes.json"),
            Ok(ReplayReport {
                phase: ElectionPhase::Closed,
                status: status(0, 0, "APC", "chris"),
                candidates: slate([0, 0, 0]),
                rejected: vec![],
                winners: Some(vec![
                    "chris".to_string(),
                    "peter".to_string(),
                    "doe".to_string()
                ]),
            })
        );

        let report = replay("example_dumps/replay_rejected.json").unwrap();
        assert_eq!(report.candidates, slate([1, 1, 0]));
        assert_eq!(report.winners, Some(vec!["chris".to_string(), "peter".to_string()]));
        assert_eq!(
            report.rejected,
            vec![
                RejectedVote {
                    voter: "early".into(),
                    candidate: 0,
                    reason: TallyError::TooEarly,
                },
                RejectedVote {
                    voter: "alice".into(),
                    candidate: 2,
                    reason: TallyError::AlreadyVoted("alice".into()),
                },
                RejectedVote {
                    voter: "confused".into(),
                    candidate: 7,
                    reason: TallyError::InvalidCandidate { index: 7, count: 3 },
                },
                RejectedVote {
                    voter: "late".into(),
                    candidate: 2,
                    reason: TallyError::TooLate,
                },
            ]
        );

        assert!(matches!(
            replay("example_dumps/replay_invalid_window.json"),
            Err(Error::Election(TallyError::InvalidWindow { .. }))
        ));
        assert!(matches!(
            replay("example_dumps/replay_malformed.json"),
            Err(Error::Format(_))
        ));
        assert!(matches!(replay("not a real file"), Err(Error::IO(_))));
    }

    #[test]
    fn correct_cli_usage() {
        let command_line = [PROGRAM_NAME, "example_dumps/replay_winner.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 0);

        let command_line = [PROGRAM_NAME, "--quiet", "example_dumps/replay_leading.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert!(args.get_flag(QUIET));
        assert_eq!(run(&args), 0);

        let command_line = [PROGRAM_NAME, "example_dumps/replay_rejected.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 255);

        let command_line = [PROGRAM_NAME, "example_dumps/replay_malformed.json"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 1);

        let command_line = [PROGRAM_NAME, "not a real file"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        assert_eq!(run(&args), 1);
    }

    #[test]
    fn bad_cli_usage() {
        // Something very wrong.
        let command_line = [PROGRAM_NAME, "this", "invocation", "is", "incorrect"];
        cli().try_get_matches_from(command_line).unwrap_err();

        // No options at all.
        let command_line = [PROGRAM_NAME];
        cli().try_get_matches_from(command_line).unwrap_err();

        // Log config without a value.
        let command_line = [PROGRAM_NAME, "example_dumps/replay_winner.json", "--log-config"];
        cli().try_get_matches_from(command_line).unwrap_err();
    }
}
