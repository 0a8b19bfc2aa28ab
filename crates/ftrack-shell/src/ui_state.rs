//! Sidecar UI state (`config.json`).
//!
//! Owned by the front end, stored next to the history database. A missing
//! or unreadable file yields defaults; keys written by other front ends
//! are carried through untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ftrack_core::error::TrackerError;

use crate::probe::PathProbe;

/// Vertical scroll offset of the browsing pane, as a fraction of its range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollPosition {
    #[serde(default)]
    pub v_relative: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    /// Directory the browsing pane showed when the app last closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_directory: Option<PathBuf>,

    #[serde(default)]
    pub scroll_position: ScrollPosition,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UiState {
    /// Read the state file, falling back to defaults if it is missing or corrupt.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "cannot read UI state, using defaults");
                return Self::default();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!(file = %path.display(), error = %e, "corrupt UI state, using defaults");
            Self::default()
        })
    }

    /// Write the state file via a temporary sibling and a rename.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Serialization`] or [`TrackerError::Io`].
    pub fn save(&self, path: &Path) -> Result<(), TrackerError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| TrackerError::Serialization(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        tracing::debug!(file = %path.display(), "saved UI state");
        Ok(())
    }

    /// Where the browsing pane should start: the last directory if it
    /// still exists, otherwise the home directory (or the filesystem root).
    pub fn initial_directory(&self, probe: &impl PathProbe) -> PathBuf {
        self.last_directory
            .as_ref()
            .filter(|dir| probe.exists(dir))
            .cloned()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from(std::path::MAIN_SEPARATOR_STR))
    }
}
