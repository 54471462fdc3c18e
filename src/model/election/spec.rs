use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, SpecError};
use crate::model::candidate::Candidate;

use super::metadata::ElectionMetadata;

/// An election specification: everything fixed at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSpec {
    /// Top-level metadata.
    #[serde(flatten)]
    pub metadata: ElectionMetadata,
    /// The slate, in ballot order.
    pub candidates: Vec<CandidateSpec>,
}

/// A candidate specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSpec {
    /// Party label.
    pub party: String,
    /// Candidate name.
    pub name: String,
}

impl ElectionSpec {
    /// Build a spec from `(party, name)` pairs.
    pub fn new<P, N>(
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        candidates: impl IntoIterator<Item = (P, N)>,
    ) -> Self
    where
        P: Into<String>,
        N: Into<String>,
    {
        Self {
            metadata: ElectionMetadata {
                title: title.into(),
                start_time,
                end_time,
            },
            candidates: candidates
                .into_iter()
                .map(|(party, name)| CandidateSpec {
                    party: party.into(),
                    name: name.into(),
                })
                .collect(),
        }
    }

    /// Build a spec from unix timestamps in seconds.
    pub fn from_timestamps<P, N>(
        title: impl Into<String>,
        start: i64,
        end: i64,
        candidates: impl IntoIterator<Item = (P, N)>,
    ) -> Result<Self>
    where
        P: Into<String>,
        N: Into<String>,
    {
        let start_time = timestamp(start)?;
        let end_time = timestamp(end)?;
        Ok(Self::new(title, start_time, end_time, candidates))
    }

    /// Parse and validate a JSON spec.
    pub fn from_reader(reader: impl Read) -> std::result::Result<Self, SpecError> {
        let spec: Self = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parse and validate a JSON spec file.
    pub fn from_path(path: impl AsRef<Path>) -> std::result::Result<Self, SpecError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Check the spec describes a usable election.
    pub fn validate(&self) -> Result<()> {
        if self.metadata.end_time <= self.metadata.start_time {
            return Err(Error::InvalidWindow {
                start: self.metadata.start_time,
                end: self.metadata.end_time,
            });
        }
        if self.candidates.is_empty() {
            return Err(Error::NoCandidates);
        }
        let mut parties = HashSet::with_capacity(self.candidates.len());
        for candidate in self.candidates.iter() {
            if !parties.insert(candidate.party.as_str()) {
                return Err(Error::DuplicateParty(candidate.party.clone()));
            }
        }
        Ok(())
    }

    /// Split into metadata and a zeroed candidate slate.
    pub(crate) fn into_parts(self) -> (ElectionMetadata, Vec<Candidate>) {
        let candidates = self
            .candidates
            .into_iter()
            .map(|c| Candidate::new(c.party, c.name))
            .collect();
        (self.metadata, candidates)
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or(Error::InvalidTimestamp(secs))
}


#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn example_is_valid() {
        assert_eq!(ElectionSpec::example().validate(), Ok(()));
    }

    #[test]
    fn window_must_be_positive() {
        let mut spec = ElectionSpec::example();
        spec.metadata.end_time = spec.metadata.start_time;
        assert!(matches!(spec.validate(), Err(Error::InvalidWindow { .. })));

        spec.metadata.end_time = spec.metadata.start_time - Duration::seconds(1);
        assert!(matches!(spec.validate(), Err(Error::InvalidWindow { .. })));
    }

    #[test]
    fn slate_must_be_non_empty_and_unique() {
        let mut spec = ElectionSpec::example();
        spec.candidates.clear();
        assert_eq!(spec.validate(), Err(Error::NoCandidates));

        let spec = ElectionSpec::new(
            "dupes",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            [("APC", "chris"), ("APC", "peter")],
        );
        assert_eq!(spec.validate(), Err(Error::DuplicateParty("APC".to_string())));
    }

    #[test]
    fn from_timestamps() {
        let spec = ElectionSpec::from_timestamps(
            "ayaversity",
            1_704_672_000,
            1_707_264_000,
            [("APC", "chris")],
        )
        .unwrap();
        assert_eq!(spec.metadata.start_time, ElectionSpec::example().metadata.start_time);
        assert_eq!(spec.metadata.end_time, ElectionSpec::example().metadata.end_time);

        assert_eq!(
            ElectionSpec::from_timestamps("bad", i64::MAX, 0, [("APC", "chris")]),
            Err(Error::InvalidTimestamp(i64::MAX))
        );
    }

    #[test]
    fn json_round_trip_keeps_slate_order() {
        let json = r#"{
            "title": "ayaversity",
            "start_time": "2024-01-08T00:00:00Z",
            "end_time": "2024-02-07T00:00:00Z",
            "candidates": [
                { "party": "APC", "name": "chris" },
                { "party": "PDP", "name": "peter" },
                { "party": "LP", "name": "doe" }
            ]
        }"#;
        let spec = ElectionSpec::from_reader(json.as_bytes()).unwrap();
        assert_eq!(spec, ElectionSpec::example());
    }

    #[test]
    fn from_reader_rejects_bad_input() {
        assert!(matches!(
            ElectionSpec::from_reader("{ not json".as_bytes()),
            Err(SpecError::Format(_))
        ));

        let json = r#"{
            "title": "backwards",
            "start_time": "2024-02-07T00:00:00Z",
            "end_time": "2024-01-08T00:00:00Z",
            "candidates": [{ "party": "APC", "name": "chris" }]
        }"#;
        assert!(matches!(
            ElectionSpec::from_reader(json.as_bytes()),
            Err(SpecError::Invalid(Error::InvalidWindow { .. }))
        ));

        assert!(matches!(
            ElectionSpec::from_path("not a real file"),
            Err(SpecError::Io(_))
        ));
    }
}
