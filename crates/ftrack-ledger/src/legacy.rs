//! Reading history databases written by older releases.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};

use ftrack_core::error::TrackerError;
use ftrack_core::normalize_path;
use ftrack_core::time::{from_epoch_seconds, parse_timestamp};

use crate::schema::column_names;

/// A row read from a legacy database, already validated.
#[derive(Debug, Clone)]
pub(crate) struct LegacyEntry {
    pub path: String,
    pub access_count: i64,
    pub last_access_time: DateTime<Utc>,
    pub is_pinned: bool,
}

/// Outcome of [`crate::Ledger::import_legacy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Paths that were new to the ledger.
    pub imported: usize,
    /// Paths that already existed and had their counters merged.
    pub merged: usize,
    /// Rows skipped because their path was invalid.
    pub skipped: usize,
}

/// Visit count from a loosely typed legacy column. Anything unusable is 1.
pub(crate) fn legacy_count(value: &Value) -> i64 {
    let count = match value {
        Value::Integer(n) => *n,
        Value::Real(f) if f.is_finite() => *f as i64,
        Value::Text(s) => s.trim().parse::<i64>().unwrap_or(1),
        _ => 1,
    };
    count.max(1)
}

/// Timestamp from a legacy column: text in any accepted layout, or epoch
/// seconds. Missing or unreadable values sort as the oldest possible visit.
pub(crate) fn legacy_timestamp(value: &Value) -> DateTime<Utc> {
    let parsed = match value {
        Value::Text(s) => parse_timestamp(s),
        Value::Real(f) => from_epoch_seconds(*f),
        Value::Integer(n) => from_epoch_seconds(*n as f64),
        _ => Err(TrackerError::Timestamp("null".to_string())),
    };
    parsed.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "unreadable legacy timestamp, treating as epoch");
        DateTime::<Utc>::UNIX_EPOCH
    })
}

/// Read every row of a legacy `paths` table, oldest row first.
///
/// Returns the valid entries and the number of rows skipped.
///
/// # Errors
///
/// Returns [`TrackerError::Storage`] if the file cannot be opened read-only
/// or has no `paths` table.
pub(crate) fn read_legacy(source: &Path) -> Result<(Vec<LegacyEntry>, usize), TrackerError> {
    let storage = |e: rusqlite::Error| {
        TrackerError::Storage(format!("legacy database {}: {e}", source.display()))
    };

    let conn = Connection::open_with_flags(
        source,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(storage)?;

    let columns = column_names(&conn, "paths").map_err(storage)?;
    if columns.is_empty() {
        return Err(TrackerError::Storage(format!(
            "legacy database {} has no paths table",
            source.display()
        )));
    }
    let pinned_expr = if columns.iter().any(|c| c == "is_pinned") {
        "is_pinned"
    } else {
        "0"
    };

    let mut stmt = conn
        .prepare(&format!(
            "SELECT path, access_count, last_access_time, {pinned_expr}
             FROM paths ORDER BY rowid"
        ))
        .map_err(storage)?;

    let raw = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, Value>(1)?,
                row.get::<_, Value>(2)?,
                row.get::<_, Option<i64>>(3)?.unwrap_or(0) != 0,
            ))
        })
        .map_err(storage)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(storage)?;

    let mut entries = Vec::with_capacity(raw.len());
    let mut skipped = 0;
    for (path, count, stamp, is_pinned) in raw {
        match path.as_deref().map(normalize_path) {
            Some(Ok(path)) => entries.push(LegacyEntry {
                path,
                access_count: legacy_count(&count),
                last_access_time: legacy_timestamp(&stamp),
                is_pinned,
            }),
            _ => {
                tracing::warn!(path = ?path, "skipping legacy row with invalid path");
                skipped += 1;
            }
        }
    }
    Ok((entries, skipped))
}
