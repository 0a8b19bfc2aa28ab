//! Schema creation and in-place migration of legacy history databases.
//!
//! Version 0 is whatever an older release left behind: a `paths` table
//! with `id`, `path`, `access_count`, `last_access_time` and (sometimes)
//! `is_pinned`, timestamps as local text or epoch floats, and pin order
//! implied by row order. Version 1 adds `pin_seq` and RFC 3339 UTC text.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use ftrack_core::error::TrackerError;
use ftrack_core::normalize_path;
use ftrack_core::time::format_timestamp;

use crate::legacy::{legacy_count, legacy_timestamp};

/// Schema version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

fn init_err(e: rusqlite::Error) -> TrackerError {
    TrackerError::StorageInit(e.to_string())
}

/// Bring the database up to [`SCHEMA_VERSION`].
///
/// # Errors
///
/// Returns [`TrackerError::StorageInit`] on any failure, including a
/// database written by a newer release.
pub(crate) fn prepare(conn: &mut Connection) -> Result<(), TrackerError> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(init_err)?;

    if version > SCHEMA_VERSION {
        return Err(TrackerError::StorageInit(format!(
            "history database has schema version {version}, this build understands up to {SCHEMA_VERSION}"
        )));
    }

    create_schema(conn)?;
    if version < 1 {
        migrate_v1(conn)?;
    }
    Ok(())
}

fn create_schema(conn: &Connection) -> Result<(), TrackerError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS paths (
            id INTEGER PRIMARY KEY,
            path TEXT UNIQUE NOT NULL,
            access_count INTEGER NOT NULL DEFAULT 1,
            last_access_time TEXT NOT NULL,
            is_pinned INTEGER NOT NULL DEFAULT 0,
            pin_seq INTEGER
        );
        ",
    )
    .map_err(init_err)
}

pub(crate) fn column_names(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

struct LegacyRow {
    id: i64,
    path: Option<String>,
    access_count: rusqlite::types::Value,
    last_access_time: rusqlite::types::Value,
    is_pinned: bool,
}

struct Merged {
    id: i64,
    access_count: i64,
    last_access_time: DateTime<Utc>,
    is_pinned: bool,
}

fn migrate_v1(conn: &mut Connection) -> Result<(), TrackerError> {
    let tx = conn.transaction().map_err(init_err)?;

    let columns = column_names(&tx, "paths").map_err(init_err)?;
    if !columns.iter().any(|c| c == "is_pinned") {
        tx.execute_batch("ALTER TABLE paths ADD COLUMN is_pinned INTEGER NOT NULL DEFAULT 0")
            .map_err(init_err)?;
    }
    if !columns.iter().any(|c| c == "pin_seq") {
        tx.execute_batch("ALTER TABLE paths ADD COLUMN pin_seq INTEGER")
            .map_err(init_err)?;
    }

    let rows = {
        let mut stmt = tx
            .prepare(
                "SELECT id, path, access_count, last_access_time, is_pinned
                 FROM paths ORDER BY id",
            )
            .map_err(init_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(LegacyRow {
                    id: row.get(0)?,
                    path: row.get(1)?,
                    access_count: row.get(2)?,
                    last_access_time: row.get(3)?,
                    is_pinned: row.get::<_, Option<i64>>(4)?.unwrap_or(0) != 0,
                })
            })
            .map_err(init_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(init_err)?;
        rows
    };

    // Group legacy spellings of the same folder; the oldest row survives.
    let mut groups: HashMap<String, Merged> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    let mut doomed: Vec<i64> = Vec::new();

    for row in rows {
        let Some(normalized) = row.path.as_deref().and_then(|p| normalize_path(p).ok()) else {
            tracing::warn!(id = row.id, path = ?row.path, "dropping legacy row with invalid path");
            doomed.push(row.id);
            continue;
        };
        let count = legacy_count(&row.access_count);
        let stamp = legacy_timestamp(&row.last_access_time);

        match groups.get_mut(&normalized) {
            Some(merged) => {
                merged.access_count += count;
                merged.last_access_time = merged.last_access_time.max(stamp);
                doomed.push(row.id);
            }
            None => {
                order.push(normalized.clone());
                groups.insert(
                    normalized,
                    Merged {
                        id: row.id,
                        access_count: count,
                        last_access_time: stamp,
                        is_pinned: row.is_pinned,
                    },
                );
            }
        }
    }

    for id in &doomed {
        tx.execute("DELETE FROM paths WHERE id = ?1", params![id])
            .map_err(init_err)?;
    }

    let mut pinned_ids: Vec<i64> = Vec::new();
    for path in &order {
        let merged = &groups[path];
        tx.execute(
            "UPDATE paths SET path = ?1, access_count = ?2, last_access_time = ?3,
                 is_pinned = ?4, pin_seq = NULL
             WHERE id = ?5",
            params![
                path,
                merged.access_count,
                format_timestamp(merged.last_access_time),
                merged.is_pinned,
                merged.id,
            ],
        )
        .map_err(init_err)?;
        if merged.is_pinned {
            pinned_ids.push(merged.id);
        }
    }

    // Legacy pin order is row order; the first row is shown first and so
    // gets the highest sequence number.
    let total = pinned_ids.len() as i64;
    for (i, id) in pinned_ids.iter().enumerate() {
        tx.execute(
            "UPDATE paths SET pin_seq = ?1 WHERE id = ?2",
            params![total - i as i64, id],
        )
        .map_err(init_err)?;
    }

    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
        .map_err(init_err)?;
    tx.commit().map_err(init_err)?;

    if !order.is_empty() || !doomed.is_empty() {
        tracing::info!(
            records = order.len(),
            dropped = doomed.len(),
            pinned = total,
            "migrated legacy history database"
        );
    }
    Ok(())
}
