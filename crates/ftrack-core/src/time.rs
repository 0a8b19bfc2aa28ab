//! Timestamp helpers.
//!
//! Visits are stamped with second resolution and stored as RFC 3339 UTC
//! text. Histories written by older releases used either local
//! `%Y-%m-%d %H:%M:%S` text or floating epoch seconds; both are still read.

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Timelike, Utc};

use crate::error::TrackerError;

/// Text layout of timestamps in legacy history databases (local time).
pub const LEGACY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current wall-clock time, truncated to whole seconds.
#[must_use]
pub fn now() -> DateTime<Utc> {
    truncate_to_seconds(Utc::now())
}

#[must_use]
pub fn truncate_to_seconds(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_nanosecond(0).unwrap_or(t)
}

/// Storage form: `2025-02-10T08:30:00Z`.
#[must_use]
pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored timestamp in any of the accepted layouts.
///
/// # Errors
///
/// Returns [`TrackerError::Timestamp`] if no layout matches.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TrackerError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(truncate_to_seconds(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, LEGACY_TIME_FORMAT) {
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| TrackerError::Timestamp(raw.to_string()));
    }
    if let Ok(secs) = raw.parse::<f64>() {
        return from_epoch_seconds(secs);
    }
    Err(TrackerError::Timestamp(raw.to_string()))
}

/// Convert legacy floating epoch seconds, dropping the fraction.
///
/// # Errors
///
/// Returns [`TrackerError::Timestamp`] if the value is not finite or out of range.
pub fn from_epoch_seconds(secs: f64) -> Result<DateTime<Utc>, TrackerError> {
    if !secs.is_finite() {
        return Err(TrackerError::Timestamp(secs.to_string()));
    }
    DateTime::from_timestamp(secs.trunc() as i64, 0)
        .ok_or_else(|| TrackerError::Timestamp(secs.to_string()))
}
