//! Readings, reading series, and decoding them from JSON input.

use std::io::Read;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::OffsetDateTime;

use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One probe sample: an absolute point in time and a raw sensor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub value: i64,
}

/// Wire form of a reading. Accepts both `["2025-10-22T22:23:51Z", 1829]`
/// and `{"timestamp": "2025-10-22T22:23:51Z", "value": 1829}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawReading {
    Pair(String, i64),
    Record { timestamp: String, value: i64 },
}

/// Readings in the order the caller supplied them. Analysis never mutates
/// a series; it works on a sorted copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReadingSeries {
    readings: Vec<Reading>,
}

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

/// Parse an ISO-8601 timestamp carrying a UTC offset.
///
/// Accepts RFC 3339 (`Z` or `±HH:MM`), a space instead of the `T`
/// separator, and a trailing ` UTC` marker. Timestamps without an offset
/// are rejected.
pub fn parse_timestamp(s: &str) -> Option<OffsetDateTime> {
    let mut normalized = s.trim().to_string();
    if let Some(stripped) = normalized.strip_suffix(" UTC") {
        normalized = format!("{stripped}Z");
    }
    if normalized.len() > 10 && normalized.as_bytes()[10] == b' ' {
        normalized.replace_range(10..11, "T");
    }

    OffsetDateTime::parse(&normalized, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(&normalized, &Iso8601::DEFAULT))
        .ok()
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Reading {
    pub fn new(timestamp: OffsetDateTime, value: i64) -> Self {
        Self { timestamp, value }
    }
}

impl RawReading {
    fn parts(&self) -> (&str, i64) {
        match self {
            RawReading::Pair(ts, value) => (ts, *value),
            RawReading::Record { timestamp, value } => (timestamp, *value),
        }
    }
}

impl ReadingSeries {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    /// Parse every raw timestamp. The first unparsable one aborts the whole
    /// series; there is no sensible default for an unknown time.
    pub fn from_raw(raw: Vec<RawReading>) -> Result<Self> {
        let mut readings = Vec::with_capacity(raw.len());
        for (index, r) in raw.iter().enumerate() {
            let (ts, value) = r.parts();
            let timestamp = parse_timestamp(ts).ok_or_else(|| AnalysisError::Timestamp {
                index,
                value: ts.to_string(),
            })?;
            readings.push(Reading::new(timestamp, value));
        }
        Ok(Self { readings })
    }

    /// Decode a JSON array of readings.
    pub fn from_json(input: &str) -> Result<Self> {
        let raw: Vec<RawReading> = serde_json::from_str(input)?;
        Self::from_raw(raw)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: Vec<RawReading> = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Chronological copy. Stable, so readings sharing a timestamp keep
    /// their input order.
    pub fn sorted(&self) -> Vec<Reading> {
        let mut sorted = self.readings.clone();
        sorted.sort_by_key(|r| r.timestamp);
        sorted
    }
}

impl FromIterator<Reading> for ReadingSeries {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    // -- parse_timestamp ----------------------------------------------------

    #[test]
    fn parse_timestamp_z_suffix() {
        assert_eq!(
            parse_timestamp("2025-10-22T22:23:51Z"),
            Some(datetime!(2025-10-22 22:23:51 UTC))
        );
    }

    #[test]
    fn parse_timestamp_explicit_offset() {
        let ts = parse_timestamp("2025-10-22T22:23:51+00:00").unwrap();
        assert_eq!(ts, datetime!(2025-10-22 22:23:51 UTC));
    }

    #[test]
    fn parse_timestamp_non_utc_offset_is_same_instant() {
        let ts = parse_timestamp("2025-10-23T00:23:51+02:00").unwrap();
        assert_eq!(ts, datetime!(2025-10-22 22:23:51 UTC));
    }

    #[test]
    fn parse_timestamp_fractional_seconds() {
        let ts = parse_timestamp("2025-10-22T22:23:51.250Z").unwrap();
        assert_eq!(ts, datetime!(2025-10-22 22:23:51.25 UTC));
    }

    #[test]
    fn parse_timestamp_space_separator() {
        let ts = parse_timestamp("2025-11-03 07:48:00+00:00").unwrap();
        assert_eq!(ts, datetime!(2025-11-03 07:48:00 UTC));
    }

    #[test]
    fn parse_timestamp_utc_marker() {
        let ts = parse_timestamp("2025-11-03 07:48:00 UTC").unwrap();
        assert_eq!(ts, datetime!(2025-11-03 07:48:00 UTC));
    }

    #[test]
    fn parse_timestamp_without_offset_rejected() {
        assert_eq!(parse_timestamp("2025-10-22T22:23:51"), None);
    }

    #[test]
    fn parse_timestamp_garbage_rejected() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    // -- JSON decoding ------------------------------------------------------

    #[test]
    fn from_json_pairs() {
        let json = r#"[["2025-10-22T22:23:51Z", 1829], ["2025-10-22T22:36:16Z", 1835]]"#;
        let series = ReadingSeries::from_json(json).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.readings()[0].value, 1829);
        assert_eq!(series.readings()[1].timestamp, datetime!(2025-10-22 22:36:16 UTC));
    }

    #[test]
    fn from_json_records() {
        let json = r#"[{"timestamp": "2025-10-22T22:23:51Z", "value": 1829}]"#;
        let series = ReadingSeries::from_json(json).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.readings()[0].value, 1829);
    }

    #[test]
    fn from_json_mixed_shapes() {
        let json = r#"[
            ["2025-10-22T22:23:51Z", 1829],
            {"timestamp": "2025-10-22T22:36:16Z", "value": 1835}
        ]"#;
        assert_eq!(ReadingSeries::from_json(json).unwrap().len(), 2);
    }

    #[test]
    fn from_json_empty_array() {
        assert!(ReadingSeries::from_json("[]").unwrap().is_empty());
    }

    #[test]
    fn from_json_bad_timestamp_reports_index() {
        let json = r#"[["2025-10-22T22:23:51Z", 1829], ["not a time", 1835]]"#;
        match ReadingSeries::from_json(json).unwrap_err() {
            AnalysisError::Timestamp { index, value } => {
                assert_eq!(index, 1);
                assert_eq!(value, "not a time");
            }
            other => panic!("expected timestamp error, got {other}"),
        }
    }

    #[test]
    fn from_json_string_value_rejected() {
        let json = r#"[["2025-10-22T22:23:51Z", "1829"]]"#;
        assert!(matches!(
            ReadingSeries::from_json(json),
            Err(AnalysisError::Format(_))
        ));
    }

    #[test]
    fn from_json_fractional_value_rejected() {
        let json = r#"[["2025-10-22T22:23:51Z", 1829.5]]"#;
        assert!(matches!(
            ReadingSeries::from_json(json),
            Err(AnalysisError::Format(_))
        ));
    }

    #[test]
    fn from_json_not_an_array_rejected() {
        assert!(ReadingSeries::from_json(r#"{"readings": []}"#).is_err());
    }

    #[test]
    fn from_reader_matches_from_json() {
        let json = r#"[["2025-10-22T22:23:51Z", 1829]]"#;
        let a = ReadingSeries::from_json(json).unwrap();
        let b = ReadingSeries::from_reader(json.as_bytes()).unwrap();
        assert_eq!(a, b);
    }

    // -- Sorting ------------------------------------------------------------

    #[test]
    fn sorted_is_chronological_and_leaves_series_untouched() {
        let series = ReadingSeries::new(vec![
            Reading::new(datetime!(2025-10-22 23:00 UTC), 3),
            Reading::new(datetime!(2025-10-22 21:00 UTC), 1),
            Reading::new(datetime!(2025-10-22 22:00 UTC), 2),
        ]);
        let values: Vec<i64> = series.sorted().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(series.readings()[0].value, 3);
    }

    #[test]
    fn sorted_keeps_tie_order() {
        let t = datetime!(2025-10-22 22:00 UTC);
        let series = ReadingSeries::new(vec![
            Reading::new(t, 7),
            Reading::new(datetime!(2025-10-22 21:00 UTC), 1),
            Reading::new(t, 5),
        ]);
        let values: Vec<i64> = series.sorted().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![1, 7, 5]);
    }

    #[test]
    fn reading_serializes_rfc3339() {
        let r = Reading::new(datetime!(2025-10-22 22:23:51 UTC), 1829);
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(json["timestamp"], "2025-10-22T22:23:51Z");
        assert_eq!(json["value"], 1829);
    }
}
