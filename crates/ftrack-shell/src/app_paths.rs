//! Per-user data directory layout.

use std::fs;
use std::path::{Path, PathBuf};

use ftrack_core::error::TrackerError;

/// Directory name under the platform data directory.
pub const APP_DIR_NAME: &str = "ftrack";

const DB_FILE: &str = "history.db";
const UI_STATE_FILE: &str = "config.json";

/// Where the history database and the UI state file live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    /// Use `override_dir` if given, otherwise `<data dir>/ftrack`
    /// (`~/.local/share`, `%APPDATA%`, `~/Library/Application Support`).
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::StorageInit`] if the platform has no
    /// per-user data directory and no override was given.
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self, TrackerError> {
        let data_dir = match override_dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::data_dir()
                .map(|d| d.join(APP_DIR_NAME))
                .ok_or_else(|| {
                    TrackerError::StorageInit("no per-user data directory on this system".into())
                })?,
        };
        Ok(Self { data_dir })
    }

    /// Create the data directory if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::StorageInit`] if it cannot be created.
    pub fn ensure(&self) -> Result<(), TrackerError> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            TrackerError::StorageInit(format!("{}: {e}", self.data_dir.display()))
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    pub fn ui_state_path(&self) -> PathBuf {
        self.data_dir.join(UI_STATE_FILE)
    }
}
