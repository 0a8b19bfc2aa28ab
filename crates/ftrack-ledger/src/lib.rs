//! # ftrack-ledger
//!
//! The access ledger: a SQLite table of visited folders.
//!
//! - One row per normalized path, created on first visit
//! - Visit counter and last-visit timestamp updated in place
//! - Pin order persisted per row as a sequence number
//! - Views computed on demand, pinned records first

mod legacy;
mod schema;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use ftrack_core::error::TrackerError;
use ftrack_core::time::{format_timestamp, now, parse_timestamp, truncate_to_seconds};
use ftrack_core::{normalize_path, order_view, PathRecord, SortKey};

pub use legacy::ImportSummary;
pub use schema::SCHEMA_VERSION;

const RECORD_COLUMNS: &str = "path, access_count, last_access_time, is_pinned";

fn storage(e: rusqlite::Error) -> TrackerError {
    TrackerError::Storage(e.to_string())
}

/// A record as read from SQLite, before its timestamp is parsed.
struct RawRecord {
    path: String,
    access_count: i64,
    last_access_time: String,
    is_pinned: bool,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            path: row.get(0)?,
            access_count: row.get(1)?,
            last_access_time: row.get(2)?,
            is_pinned: row.get(3)?,
        })
    }

    fn into_record(self) -> Result<PathRecord, TrackerError> {
        Ok(PathRecord {
            last_access_time: parse_timestamp(&self.last_access_time)?,
            access_count: u64::try_from(self.access_count.max(1)).unwrap_or(1),
            path: self.path,
            is_pinned: self.is_pinned,
        })
    }
}

/// The Ledger owns the history database connection.
pub struct Ledger {
    conn: Connection,
}

impl Ledger {
    /// Open or create a history database at the given path.
    ///
    /// A database written by an older release is migrated in place.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::StorageInit`] if the database cannot be
    /// opened, is not a database, or cannot be migrated.
    pub fn open(path: &Path) -> Result<Self, TrackerError> {
        let conn = Connection::open(path)
            .map_err(|e| TrackerError::StorageInit(format!("{}: {e}", path.display())))?;
        let ledger = Self::init(conn)?;
        tracing::debug!(db = %path.display(), "opened history database");
        Ok(ledger)
    }

    /// Create an in-memory ledger (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::StorageInit`] if schema creation fails.
    pub fn in_memory() -> Result<Self, TrackerError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TrackerError::StorageInit(e.to_string()))?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Result<Self, TrackerError> {
        schema::prepare(&mut conn)?;
        Ok(Self { conn })
    }

    /// Record a visit to `path` at the current time.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidPath`] for an empty or relative path
    /// (nothing is stored), or [`TrackerError::Storage`] on a database failure.
    pub fn record_visit(&self, path: &str) -> Result<PathRecord, TrackerError> {
        self.record_visit_at(path, now())
    }

    /// Record a visit to `path` at `at`.
    ///
    /// Inserts a record with count 1 on the first visit; afterwards the
    /// count is incremented and the timestamp replaced, in one statement.
    ///
    /// # Errors
    ///
    /// See [`Ledger::record_visit`].
    pub fn record_visit_at(
        &self,
        path: &str,
        at: DateTime<Utc>,
    ) -> Result<PathRecord, TrackerError> {
        let path = normalize_path(path)?;
        let stamp = format_timestamp(truncate_to_seconds(at));

        let raw = self
            .conn
            .query_row(
                &format!(
                    "INSERT INTO paths (path, access_count, last_access_time)
                     VALUES (?1, 1, ?2)
                     ON CONFLICT(path) DO UPDATE SET
                         access_count = access_count + 1,
                         last_access_time = excluded.last_access_time
                     RETURNING {RECORD_COLUMNS}"
                ),
                params![path, stamp],
                RawRecord::from_row,
            )
            .map_err(storage)?;

        let record = raw.into_record()?;
        tracing::debug!(path = %record.path, count = record.access_count, "recorded visit");
        Ok(record)
    }

    /// Delete the record for `path`, pinned or not.
    ///
    /// Returns `false` if there was no such record.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidPath`] or [`TrackerError::Storage`].
    pub fn remove(&self, path: &str) -> Result<bool, TrackerError> {
        let path = normalize_path(path)?;
        let removed = self
            .conn
            .execute("DELETE FROM paths WHERE path = ?1", params![path])
            .map_err(storage)?;
        if removed > 0 {
            tracing::debug!(path = %path, "removed record");
        }
        Ok(removed > 0)
    }

    /// Delete every record, pins included.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the delete fails.
    pub fn clear_all(&self) -> Result<(), TrackerError> {
        let removed = self
            .conn
            .execute("DELETE FROM paths", [])
            .map_err(storage)?;
        tracing::debug!(removed, "cleared history");
        Ok(())
    }

    /// Pin an existing, unpinned record at the front of the pinned list.
    ///
    /// Returns `false` if the path has no record or is already pinned.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidPath`] or [`TrackerError::Storage`].
    pub fn pin(&self, path: &str) -> Result<bool, TrackerError> {
        let path = normalize_path(path)?;
        let changed = self
            .conn
            .execute(
                "UPDATE paths
                 SET is_pinned = 1,
                     pin_seq = (SELECT COALESCE(MAX(pin_seq), 0) + 1 FROM paths)
                 WHERE path = ?1 AND is_pinned = 0",
                params![path],
            )
            .map_err(storage)?;
        if changed > 0 {
            tracing::debug!(path = %path, "pinned");
        }
        Ok(changed > 0)
    }

    /// Unpin a pinned record. Returns `false` if it was not pinned.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidPath`] or [`TrackerError::Storage`].
    pub fn unpin(&self, path: &str) -> Result<bool, TrackerError> {
        let path = normalize_path(path)?;
        let changed = self
            .conn
            .execute(
                "UPDATE paths SET is_pinned = 0, pin_seq = NULL
                 WHERE path = ?1 AND is_pinned = 1",
                params![path],
            )
            .map_err(storage)?;
        if changed > 0 {
            tracing::debug!(path = %path, "unpinned");
        }
        Ok(changed > 0)
    }

    /// The ordered history: pinned records (most recently pinned first),
    /// then the rest sorted by `key`, ties in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the query fails.
    pub fn list_view(
        &self,
        key: SortKey,
        descending: bool,
    ) -> Result<Vec<PathRecord>, TrackerError> {
        let pinned = self.select(&format!(
            "SELECT {RECORD_COLUMNS} FROM paths
             WHERE is_pinned = 1
             ORDER BY pin_seq DESC, id ASC"
        ))?;
        let unpinned = self.select(&format!(
            "SELECT {RECORD_COLUMNS} FROM paths
             WHERE is_pinned = 0
             ORDER BY id ASC"
        ))?;
        Ok(order_view(pinned, unpinned, key, descending))
    }

    fn select(&self, sql: &str) -> Result<Vec<PathRecord>, TrackerError> {
        let mut stmt = self.conn.prepare(sql).map_err(storage)?;
        let raw = stmt
            .query_map([], RawRecord::from_row)
            .map_err(storage)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(storage)?;
        raw.into_iter().map(RawRecord::into_record).collect()
    }

    /// Look up a single record.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidPath`] or [`TrackerError::Storage`].
    pub fn get(&self, path: &str) -> Result<Option<PathRecord>, TrackerError> {
        let path = normalize_path(path)?;
        self.conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM paths WHERE path = ?1"),
                params![path],
                RawRecord::from_row,
            )
            .optional()
            .map_err(storage)?
            .map(RawRecord::into_record)
            .transpose()
    }

    /// Number of records in the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the query fails.
    pub fn len(&self) -> Result<u64, TrackerError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM paths", [], |row| row.get(0))
            .map_err(storage)?;
        Ok(count as u64)
    }

    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the query fails.
    pub fn is_empty(&self) -> Result<bool, TrackerError> {
        Ok(self.len()? == 0)
    }

    /// Merge the history of a legacy database file into this ledger.
    ///
    /// New paths are inserted with their legacy counters. Paths already
    /// present have the counts added and keep the later timestamp. Legacy
    /// pins are pinned in their legacy order, ahead of existing pins.
    /// The whole import is one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if the legacy file cannot be read
    /// or the merge fails; the ledger is then unchanged.
    pub fn import_legacy(&mut self, source: &Path) -> Result<ImportSummary, TrackerError> {
        let (entries, skipped) = legacy::read_legacy(source)?;
        let mut summary = ImportSummary {
            skipped,
            ..ImportSummary::default()
        };

        let tx = self.conn.transaction().map_err(storage)?;
        for entry in &entries {
            let exists: bool = tx
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM paths WHERE path = ?1)",
                    params![entry.path],
                    |row| row.get(0),
                )
                .map_err(storage)?;
            tx.execute(
                "INSERT INTO paths (path, access_count, last_access_time)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(path) DO UPDATE SET
                     access_count = access_count + excluded.access_count,
                     last_access_time = MAX(last_access_time, excluded.last_access_time)",
                params![
                    entry.path,
                    entry.access_count,
                    format_timestamp(entry.last_access_time)
                ],
            )
            .map_err(storage)?;
            if exists {
                summary.merged += 1;
            } else {
                summary.imported += 1;
            }
        }

        // Pin back to front so the first legacy pin ends up on top.
        for entry in entries.iter().rev().filter(|e| e.is_pinned) {
            tx.execute(
                "UPDATE paths
                 SET is_pinned = 1,
                     pin_seq = (SELECT COALESCE(MAX(pin_seq), 0) + 1 FROM paths)
                 WHERE path = ?1 AND is_pinned = 0",
                params![entry.path],
            )
            .map_err(storage)?;
        }
        tx.commit().map_err(storage)?;

        tracing::info!(
            source = %source.display(),
            imported = summary.imported,
            merged = summary.merged,
            skipped = summary.skipped,
            "imported legacy history"
        );
        Ok(summary)
    }

    /// Flush and close the database.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] if SQLite refuses to close.
    pub fn close(self) -> Result<(), TrackerError> {
        self.conn.close().map_err(|(_, e)| storage(e))?;
        tracing::debug!("closed history database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 10, 9, 0, 0).unwrap()
    }

    fn view_paths(ledger: &Ledger, key: SortKey, descending: bool) -> Vec<String> {
        ledger
            .list_view(key, descending)
            .unwrap()
            .into_iter()
            .map(|r| r.path)
            .collect()
    }

    #[test]
    fn creates_schema_on_init() {
        let ledger = Ledger::in_memory().unwrap();
        assert_eq!(ledger.len().unwrap(), 0);
        assert!(ledger.is_empty().unwrap());
    }

    #[test]
    fn first_visit_inserts_record_with_count_one() {
        let ledger = Ledger::in_memory().unwrap();
        let record = ledger.record_visit_at("/srv/data", t0()).unwrap();

        assert_eq!(record.path, "/srv/data");
        assert_eq!(record.access_count, 1);
        assert_eq!(record.last_access_time, t0());
        assert!(!record.is_pinned);
    }

    #[test]
    fn repeated_visits_update_in_place() {
        let ledger = Ledger::in_memory().unwrap();
        ledger.record_visit_at("/a", t0()).unwrap();
        ledger
            .record_visit_at("/a", t0() + Duration::minutes(5))
            .unwrap();
        let last = ledger
            .record_visit_at("/a", t0() + Duration::minutes(9))
            .unwrap();

        assert_eq!(ledger.len().unwrap(), 1);
        assert_eq!(last.access_count, 3);
        assert_eq!(last.last_access_time, t0() + Duration::minutes(9));
        assert_eq!(ledger.get("/a").unwrap(), Some(last));
    }

    #[test]
    fn visit_truncates_to_whole_seconds() {
        let ledger = Ledger::in_memory().unwrap();
        let at = t0() + Duration::milliseconds(750);
        let record = ledger.record_visit_at("/a", at).unwrap();
        assert_eq!(record.last_access_time, t0());
    }

    #[test]
    fn trailing_separator_does_not_duplicate() {
        let ledger = Ledger::in_memory().unwrap();
        ledger.record_visit_at("/srv/data", t0()).unwrap();
        let record = ledger.record_visit_at("/srv/data/", t0()).unwrap();
        assert_eq!(record.access_count, 2);
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn invalid_paths_are_rejected_without_insert() {
        let ledger = Ledger::in_memory().unwrap();
        for bad in ["", "   ", "relative/dir"] {
            let err = ledger.record_visit(bad).unwrap_err();
            assert!(matches!(err, TrackerError::InvalidPath(_)), "{bad:?}");
        }
        assert_eq!(ledger.len().unwrap(), 0);
    }

    #[test]
    fn remove_deletes_and_reports() {
        let ledger = Ledger::in_memory().unwrap();
        ledger.record_visit_at("/x", t0()).unwrap();
        ledger.record_visit_at("/y", t0()).unwrap();

        assert!(ledger.remove("/x").unwrap());
        assert_eq!(view_paths(&ledger, SortKey::Frequency, true), ["/y"]);
        assert!(!ledger.remove("/x").unwrap());
    }

    #[test]
    fn remove_missing_path_is_noop() {
        let ledger = Ledger::in_memory().unwrap();
        assert!(!ledger.remove("/never/seen").unwrap());
    }

    #[test]
    fn remove_pinned_record_drops_it_from_pins() {
        let ledger = Ledger::in_memory().unwrap();
        ledger.record_visit_at("/p", t0()).unwrap();
        ledger.record_visit_at("/q", t0()).unwrap();
        ledger.pin("/p").unwrap();

        assert!(ledger.remove("/p").unwrap());
        let view = ledger.list_view(SortKey::Frequency, true).unwrap();
        assert_eq!(view.len(), 1);
        assert!(view.iter().all(|r| !r.is_pinned));

        // A fresh visit starts over as an unpinned record.
        let record = ledger.record_visit_at("/p", t0()).unwrap();
        assert_eq!(record.access_count, 1);
        assert!(!record.is_pinned);
    }

    #[test]
    fn clear_all_empties_every_view() {
        let ledger = Ledger::in_memory().unwrap();
        ledger.record_visit_at("/a", t0()).unwrap();
        ledger.record_visit_at("/b", t0()).unwrap();
        ledger.pin("/b").unwrap();

        ledger.clear_all().unwrap();
        for key in [SortKey::Frequency, SortKey::Recency, SortKey::Path] {
            assert!(ledger.list_view(key, true).unwrap().is_empty());
        }
        // Clearing an empty ledger is fine.
        ledger.clear_all().unwrap();
    }

    #[test]
    fn pinned_record_leads_despite_lower_count() {
        let ledger = Ledger::in_memory().unwrap();
        for _ in 0..3 {
            ledger.record_visit_at("/a", t0()).unwrap();
        }
        ledger.record_visit_at("/b", t0()).unwrap();
        assert!(ledger.pin("/b").unwrap());

        let view = ledger.list_view(SortKey::Frequency, true).unwrap();
        let paths: Vec<&str> = view.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["/b", "/a"]);
        assert_eq!(view[1].access_count, 3);
        assert!(view[0].is_pinned);
    }

    #[test]
    fn pin_requires_existing_record() {
        let ledger = Ledger::in_memory().unwrap();
        assert!(!ledger.pin("/nowhere").unwrap());
        assert_eq!(ledger.len().unwrap(), 0);
    }

    #[test]
    fn pin_twice_is_noop() {
        let ledger = Ledger::in_memory().unwrap();
        ledger.record_visit_at("/a", t0()).unwrap();
        ledger.record_visit_at("/b", t0()).unwrap();

        assert!(ledger.pin("/a").unwrap());
        assert!(ledger.pin("/b").unwrap());
        assert!(!ledger.pin("/a").unwrap());

        // Re-pinning /a did not move it in front of /b.
        assert_eq!(view_paths(&ledger, SortKey::Frequency, true), ["/b", "/a"]);
    }

    #[test]
    fn most_recently_pinned_comes_first() {
        let ledger = Ledger::in_memory().unwrap();
        for p in ["/one", "/two", "/three"] {
            ledger.record_visit_at(p, t0()).unwrap();
        }
        ledger.pin("/two").unwrap();
        ledger.pin("/one").unwrap();
        ledger.pin("/three").unwrap();

        assert_eq!(
            view_paths(&ledger, SortKey::Path, false),
            ["/three", "/one", "/two"]
        );
    }

    #[test]
    fn unpin_returns_record_to_sorted_segment() {
        let ledger = Ledger::in_memory().unwrap();
        ledger.record_visit_at("/a", t0()).unwrap();
        ledger.record_visit_at("/a", t0()).unwrap();
        ledger.record_visit_at("/b", t0()).unwrap();
        ledger.pin("/b").unwrap();

        assert!(ledger.unpin("/b").unwrap());
        assert!(!ledger.unpin("/b").unwrap());
        assert!(!ledger.unpin("/a").unwrap());
        assert_eq!(view_paths(&ledger, SortKey::Frequency, true), ["/a", "/b"]);
    }

    #[test]
    fn visiting_pinned_record_keeps_pin() {
        let ledger = Ledger::in_memory().unwrap();
        ledger.record_visit_at("/a", t0()).unwrap();
        ledger.pin("/a").unwrap();
        let record = ledger.record_visit_at("/a", t0()).unwrap();
        assert!(record.is_pinned);
        assert_eq!(record.access_count, 2);
    }

    #[test]
    fn recency_view_orders_by_last_visit() {
        let ledger = Ledger::in_memory().unwrap();
        ledger.record_visit_at("/old", t0()).unwrap();
        ledger
            .record_visit_at("/new", t0() + Duration::hours(2))
            .unwrap();
        ledger
            .record_visit_at("/mid", t0() + Duration::hours(1))
            .unwrap();

        assert_eq!(
            view_paths(&ledger, SortKey::Recency, true),
            ["/new", "/mid", "/old"]
        );
        assert_eq!(
            view_paths(&ledger, SortKey::Recency, false),
            ["/old", "/mid", "/new"]
        );
    }

    #[test]
    fn frequency_ties_keep_insertion_order() {
        let ledger = Ledger::in_memory().unwrap();
        for p in ["/c", "/a", "/b"] {
            ledger.record_visit_at(p, t0()).unwrap();
        }
        assert_eq!(
            view_paths(&ledger, SortKey::Frequency, true),
            ["/c", "/a", "/b"]
        );
        assert_eq!(
            view_paths(&ledger, SortKey::Frequency, false),
            ["/c", "/a", "/b"]
        );
    }

    #[test]
    fn view_reflects_latest_state() {
        let ledger = Ledger::in_memory().unwrap();
        ledger.record_visit_at("/a", t0()).unwrap();
        ledger.record_visit_at("/b", t0()).unwrap();
        assert_eq!(view_paths(&ledger, SortKey::Frequency, true), ["/a", "/b"]);

        ledger.record_visit_at("/b", t0()).unwrap();
        assert_eq!(view_paths(&ledger, SortKey::Frequency, true), ["/b", "/a"]);
    }

    #[test]
    fn history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("history.db");

        let ledger = Ledger::open(&db).unwrap();
        ledger.record_visit_at("/a", t0()).unwrap();
        ledger.record_visit_at("/b", t0()).unwrap();
        ledger.record_visit_at("/c", t0()).unwrap();
        ledger.pin("/c").unwrap();
        ledger.pin("/a").unwrap();
        ledger.close().unwrap();

        let reopened = Ledger::open(&db).unwrap();
        assert_eq!(
            view_paths(&reopened, SortKey::Frequency, true),
            ["/a", "/c", "/b"]
        );
    }

    #[test]
    fn open_rejects_non_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("history.db");
        std::fs::write(&db, b"this is definitely not an sqlite file, just text padding").unwrap();

        let err = Ledger::open(&db).err().unwrap();
        assert!(matches!(err, TrackerError::StorageInit(_)), "{err}");
    }

    #[test]
    fn open_fails_when_directory_missing() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("missing").join("history.db");
        let err = Ledger::open(&db).err().unwrap();
        assert!(matches!(err, TrackerError::StorageInit(_)));
    }

    #[test]
    fn open_rejects_newer_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("history.db");
        {
            let conn = Connection::open(&db).unwrap();
            conn.execute_batch("PRAGMA user_version = 99").unwrap();
        }
        let err = Ledger::open(&db).err().unwrap();
        assert!(matches!(err, TrackerError::StorageInit(_)));
        assert!(err.to_string().contains("99"));
    }

    fn legacy_v11(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            r"CREATE TABLE paths (
                id INTEGER PRIMARY KEY,
                path TEXT UNIQUE,
                access_count INTEGER DEFAULT 1,
                last_access_time TEXT,
                is_pinned INTEGER DEFAULT 0
            );
            INSERT INTO paths (path, access_count, last_access_time, is_pinned)
                VALUES ('C:\Work\Second', 2, '2024-06-01 12:00:00', 1);
            INSERT INTO paths (path, access_count, last_access_time, is_pinned)
                VALUES ('C:\Work\First', 1, '2024-06-02 12:00:00', 1);
            INSERT INTO paths (path, access_count, last_access_time, is_pinned)
                VALUES ('C:\Games', 7, '2024-05-01 08:00:00', 0);
            INSERT INTO paths (path, access_count, last_access_time, is_pinned)
                VALUES ('C:\Games\', 3, '2024-06-03 08:00:00', 0);
            INSERT INTO paths (path, access_count, last_access_time, is_pinned)
                VALUES ('', 1, '2024-06-03 08:00:00', 0);",
        )
        .unwrap();
    }

    #[test]
    fn migrates_legacy_text_schema_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("file_tracker.db");
        legacy_v11(&db);

        let ledger = Ledger::open(&db).unwrap();
        let view = ledger.list_view(SortKey::Frequency, true).unwrap();
        let paths: Vec<&str> = view.iter().map(|r| r.path.as_str()).collect();

        // Legacy pin order is row order; duplicate spellings merged; blank row dropped.
        assert_eq!(paths, [r"C:\Work\Second", r"C:\Work\First", r"C:\Games"]);
        assert!(view[0].is_pinned && view[1].is_pinned && !view[2].is_pinned);
        assert_eq!(view[2].access_count, 10);

        let stored: String = ledger
            .conn
            .query_row(
                "SELECT last_access_time FROM paths WHERE path = ?1",
                params![r"C:\Games"],
                |row| row.get(0),
            )
            .unwrap();
        assert!(stored.ends_with('Z'), "{stored}");

        let version: i64 = ledger
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);

        // New pins still go in front of migrated ones.
        ledger.pin(r"C:\Games").unwrap();
        assert_eq!(ledger.list_view(SortKey::Path, false).unwrap()[0].path, r"C:\Games");
    }

    #[test]
    fn migrates_legacy_epoch_schema_without_pin_column() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("file_access.db");
        {
            let conn = Connection::open(&db).unwrap();
            conn.execute_batch(
                "CREATE TABLE paths (
                    id INTEGER PRIMARY KEY,
                    path TEXT UNIQUE,
                    access_count INTEGER DEFAULT 1,
                    last_access_time REAL
                );
                INSERT INTO paths (path, access_count, last_access_time)
                    VALUES ('/home/me/music', 4, 1717243200.25);",
            )
            .unwrap();
        }

        let ledger = Ledger::open(&db).unwrap();
        let record = ledger.get("/home/me/music").unwrap().unwrap();
        assert_eq!(record.access_count, 4);
        assert_eq!(
            record.last_access_time,
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
        );
        assert!(!record.is_pinned);

        let updated = ledger.record_visit_at("/home/me/music", t0()).unwrap();
        assert_eq!(updated.access_count, 5);
        assert_eq!(updated.last_access_time, t0());
    }

    #[test]
    fn import_merges_legacy_history() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = dir.path().join("file_tracker.db");
        legacy_v11(&legacy);

        let mut ledger = Ledger::in_memory().unwrap();
        ledger
            .record_visit_at(r"C:\Games", Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
            .unwrap();
        ledger.record_visit_at("/mine", t0()).unwrap();
        ledger.pin("/mine").unwrap();

        let summary = ledger.import_legacy(&legacy).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                imported: 2,
                merged: 2,
                skipped: 1,
            }
        );

        let games = ledger.get(r"C:\Games").unwrap().unwrap();
        assert_eq!(games.access_count, 11);
        assert_eq!(
            games.last_access_time,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );

        let view = view_paths(&ledger, SortKey::Frequency, true);
        assert_eq!(
            view,
            [r"C:\Work\Second", r"C:\Work\First", "/mine", r"C:\Games"]
        );

        // The legacy file is only read.
        let conn = Connection::open(&legacy).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM paths", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 5);
    }

    #[test]
    fn import_of_missing_file_leaves_ledger_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::in_memory().unwrap();
        ledger.record_visit_at("/a", t0()).unwrap();

        let err = ledger.import_legacy(&dir.path().join("nope.db")).unwrap_err();
        assert!(matches!(err, TrackerError::Storage(_)));
        assert_eq!(ledger.len().unwrap(), 1);
    }

    proptest! {
        #[test]
        fn count_equals_number_of_visits(visits in prop::collection::vec(0usize..4, 1..40)) {
            let ledger = Ledger::in_memory().unwrap();
            let names = ["/a", "/b", "/c", "/d"];
            let mut expected = [0u64; 4];
            let mut last = [None; 4];

            for (step, &i) in visits.iter().enumerate() {
                let at = t0() + Duration::seconds(step as i64);
                ledger.record_visit_at(names[i], at).unwrap();
                expected[i] += 1;
                last[i] = Some(at);
            }

            for i in 0..4 {
                let record = ledger.get(names[i]).unwrap();
                match last[i] {
                    None => prop_assert!(record.is_none()),
                    Some(at) => {
                        let record = record.unwrap();
                        prop_assert_eq!(record.access_count, expected[i]);
                        prop_assert_eq!(record.last_access_time, at);
                    }
                }
            }
            prop_assert_eq!(
                ledger.len().unwrap(),
                last.iter().filter(|t| t.is_some()).count() as u64
            );
        }

        #[test]
        fn pinned_prefix_holds_after_any_pin_sequence(
            counts in prop::collection::vec(1usize..5, 1..8),
            pins in prop::collection::vec(0usize..8, 0..8),
        ) {
            let ledger = Ledger::in_memory().unwrap();
            for (i, &n) in counts.iter().enumerate() {
                for _ in 0..n {
                    ledger.record_visit_at(&format!("/dir{i}"), t0()).unwrap();
                }
            }
            for &p in &pins {
                ledger.pin(&format!("/dir{p}")).unwrap();
            }

            let view = ledger.list_view(SortKey::Frequency, true).unwrap();
            prop_assert_eq!(view.len(), counts.len());
            let first_unpinned = view.iter().position(|r| !r.is_pinned).unwrap_or(view.len());
            prop_assert!(view[first_unpinned..].iter().all(|r| !r.is_pinned));

            let mut seen = std::collections::HashSet::new();
            prop_assert!(view.iter().all(|r| seen.insert(r.path.clone())));
        }
    }
}
