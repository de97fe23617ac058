// realism-gate-core/src/time.rs
// ============================================================================
// Module: Timestamps And Run Identifiers
// Description: UTC timestamp wrapper and run-id minting with an embedded
//              timestamp component.
// Purpose: Make "a run id contains a UTC timestamp" structural rather than
//          a convention callers could drop.
// Dependencies: time
// ============================================================================

//! Timestamps and run-identifier minting.
//!
//! Run identifiers must "contain a UTC timestamp" (data model invariant,
//! §3) and artifact directories are never renamed, so the timestamp is
//! baked into the identifier at construction time rather than tracked
//! separately.

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::identifiers::RunId;

/// A UTC timestamp, serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(#[serde(with = "time::serde::rfc3339")] OffsetDateTime);

impl Timestamp {
    /// Wraps an existing `OffsetDateTime`, normalizing it to UTC.
    #[must_use]
    pub fn new(at: OffsetDateTime) -> Self {
        Self(at.to_offset(time::UtcOffset::UTC))
    }

    /// Returns the wrapped `OffsetDateTime`.
    #[must_use]
    pub const fn as_offset_date_time(&self) -> OffsetDateTime {
        self.0
    }

    /// Formats the timestamp for embedding in identifiers:
    /// `YYYYMMDDTHHMMSSZ`.
    #[must_use]
    pub fn compact(&self) -> String {
        format!(
            "{:04}{:02}{:02}T{:02}{:02}{:02}Z",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day(),
            self.0.hour(),
            self.0.minute(),
            self.0.second()
        )
    }

    /// Parses an RFC 3339 timestamp string.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::Parse`] when `value` is not valid RFC 3339.
    pub fn parse(value: &str) -> Result<Self, TimeError> {
        OffsetDateTime::parse(value, &Rfc3339)
            .map(Self::new)
            .map_err(|err| TimeError::Parse(err.to_string()))
    }

    /// Formats the timestamp as RFC 3339, for embedding in ledgers and logs
    /// that store plain text rather than JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::Parse`] in the unreachable case that formatting
    /// itself fails (the wrapped value is always constructed as valid UTC).
    pub fn to_rfc3339(&self) -> Result<String, TimeError> {
        self.0.format(&Rfc3339).map_err(|err| TimeError::Parse(err.to_string()))
    }
}

/// Errors raised while parsing timestamps.
#[derive(Debug, Error)]
pub enum TimeError {
    /// The input was not a valid RFC 3339 timestamp.
    #[error("invalid rfc3339 timestamp: {0}")]
    Parse(String),
}

/// Mints a fresh [`RunId`] embedding `at` and a caller-supplied random
/// suffix (the caller owns entropy so this module stays deterministic and
/// testable: see [`mint_run_id`] callers for the only source of randomness
/// in identifier minting).
#[must_use]
pub fn mint_run_id(at: Timestamp, random_suffix: &str) -> RunId {
    RunId::new(format!("run-{}-{random_suffix}", at.compact()))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::Timestamp;
    use super::mint_run_id;

    #[test]
    fn compact_formats_as_utc_basic() {
        let at = Timestamp::new(datetime!(2026-07-28 09:05:03 UTC));
        assert_eq!(at.compact(), "20260728T090503Z");
    }

    #[test]
    fn mint_run_id_embeds_timestamp_and_suffix() {
        let at = Timestamp::new(datetime!(2026-07-28 09:05:03 UTC));
        let run_id = mint_run_id(at, "ab12cd34");
        assert_eq!(run_id.as_str(), "run-20260728T090503Z-ab12cd34");
    }

    #[test]
    fn parse_round_trips_rfc3339() {
        let parsed = Timestamp::parse("2026-07-28T09:05:03Z").expect("parse timestamp");
        assert_eq!(parsed.compact(), "20260728T090503Z");
    }

    #[test]
    fn to_rfc3339_round_trips_through_parse() {
        let at = Timestamp::new(datetime!(2026-07-28 09:05:03 UTC));
        let formatted = at.to_rfc3339().expect("format timestamp");
        let parsed = Timestamp::parse(&formatted).expect("parse formatted timestamp");
        assert_eq!(parsed.compact(), at.compact());
    }
}
