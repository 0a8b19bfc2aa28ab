//! The front-end facade over the ledger.
//!
//! Front ends translate user actions into calls on [`Tracker`]; it owns
//! the ledger, checks paths against the filesystem before opening them,
//! and persists UI state on shutdown.

use std::path::{Component, Path, PathBuf};

use ftrack_core::error::{PathError, TrackerError};
use ftrack_core::{normalize_path, PathRecord, SortKey};
use ftrack_ledger::{ImportSummary, Ledger};

use crate::app_paths::AppPaths;
use crate::launcher::{folder_to_open, Launcher, SystemLauncher};
use crate::probe::{FsProbe, PathProbe};
use crate::ui_state::UiState;

/// Result of asking to open a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The folder exists; its visit was recorded.
    Opened(PathRecord),
    /// The path is gone; any record of it was removed.
    Stale(String),
}

pub struct Tracker<P = FsProbe, L = SystemLauncher> {
    ledger: Ledger,
    probe: P,
    launcher: L,
    ui_state: UiState,
    ui_state_path: Option<PathBuf>,
}

impl Tracker<FsProbe, SystemLauncher> {
    /// Open the history under `paths`, creating the data directory.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::StorageInit`] if the directory or the
    /// database cannot be set up.
    pub fn open_default(paths: &AppPaths, launcher: SystemLauncher) -> Result<Self, TrackerError> {
        paths.ensure()?;
        let ledger = Ledger::open(&paths.db_path())?;
        Ok(Self::new(ledger, FsProbe, launcher).with_ui_state(paths.ui_state_path()))
    }
}

impl<P: PathProbe, L: Launcher> Tracker<P, L> {
    pub fn new(ledger: Ledger, probe: P, launcher: L) -> Self {
        Self {
            ledger,
            probe,
            launcher,
            ui_state: UiState::default(),
            ui_state_path: None,
        }
    }

    /// Load UI state from `path` and save it back there on shutdown.
    #[must_use]
    pub fn with_ui_state(mut self, path: PathBuf) -> Self {
        self.ui_state = UiState::load(&path);
        self.ui_state_path = Some(path);
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui_state
    }

    pub fn ui_state_mut(&mut self) -> &mut UiState {
        &mut self.ui_state
    }

    /// Where a browsing pane should start.
    pub fn initial_directory(&self) -> PathBuf {
        self.ui_state.initial_directory(&self.probe)
    }

    /// Record a visit and show the folder.
    ///
    /// A file path opens (and records) its containing folder. A missing
    /// path is removed from the history and reported as stale. A failed
    /// launch is logged; the visit stays recorded.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidPath`] or [`TrackerError::Storage`].
    pub fn open(&mut self, path: &str) -> Result<OpenOutcome, TrackerError> {
        self.visit_inner(path, true)
    }

    /// Record a visit without launching anything.
    ///
    /// # Errors
    ///
    /// See [`Tracker::open`].
    pub fn visit(&mut self, path: &str) -> Result<OpenOutcome, TrackerError> {
        self.visit_inner(path, false)
    }

    /// Open the folder the last session ended in, or the home directory
    /// if it is gone.
    ///
    /// # Errors
    ///
    /// See [`Tracker::open`].
    pub fn open_last(&mut self) -> Result<OpenOutcome, TrackerError> {
        let folder = self.initial_directory();
        self.open(&path_key(&folder)?)
    }

    fn visit_inner(&mut self, path: &str, launch: bool) -> Result<OpenOutcome, TrackerError> {
        let requested = resolve(path)?;

        if !self.probe.exists(&requested) {
            let key = path_key(&requested)?;
            let removed = self.ledger.remove(&key)?;
            tracing::warn!(path = %key, removed, "path no longer exists");
            return Ok(OpenOutcome::Stale(key));
        }

        let folder = folder_to_open(&requested, &self.probe);
        let record = self.ledger.record_visit(&path_key(&folder)?)?;

        if launch {
            if let Err(e) = self.launcher.launch(&folder) {
                tracing::warn!(folder = %folder.display(), error = %e, "could not open file browser");
            }
        }
        self.ui_state.last_directory = Some(folder);
        Ok(OpenOutcome::Opened(record))
    }

    /// Forget one path.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidPath`] or [`TrackerError::Storage`].
    pub fn remove(&self, path: &str) -> Result<bool, TrackerError> {
        self.ledger.remove(&path_key(&resolve(path)?)?)
    }

    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidPath`] or [`TrackerError::Storage`].
    pub fn pin(&self, path: &str) -> Result<bool, TrackerError> {
        self.ledger.pin(&path_key(&resolve(path)?)?)
    }

    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidPath`] or [`TrackerError::Storage`].
    pub fn unpin(&self, path: &str) -> Result<bool, TrackerError> {
        self.ledger.unpin(&path_key(&resolve(path)?)?)
    }

    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`].
    pub fn clear(&self) -> Result<(), TrackerError> {
        self.ledger.clear_all()
    }

    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`].
    pub fn view(&self, key: SortKey, descending: bool) -> Result<Vec<PathRecord>, TrackerError> {
        self.ledger.list_view(key, descending)
    }

    /// Remove every record whose path no longer exists; returns those paths.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`].
    pub fn prune(&self) -> Result<Vec<String>, TrackerError> {
        let mut removed = Vec::new();
        for record in self.ledger.list_view(SortKey::Path, false)? {
            if !self.probe.exists(Path::new(&record.path)) && self.ledger.remove(&record.path)? {
                tracing::info!(path = %record.path, "pruned stale path");
                removed.push(record.path);
            }
        }
        Ok(removed)
    }

    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`].
    pub fn import_legacy(&mut self, source: &Path) -> Result<ImportSummary, TrackerError> {
        self.ledger.import_legacy(source)
    }

    /// Persist UI state, then flush and close the ledger.
    ///
    /// # Errors
    ///
    /// Returns the first failure; the ledger is closed even if saving UI
    /// state failed.
    pub fn shutdown(self) -> Result<(), TrackerError> {
        let saved = match &self.ui_state_path {
            Some(path) => self.ui_state.save(path),
            None => Ok(()),
        };
        let closed = self.ledger.close();
        saved.and(closed)
    }
}

/// Turn user input into the path its ledger key is taken from.
///
/// Input the ledger already accepts as absolute, including the other
/// platform's form, is kept as written; anything else is joined to the
/// current directory. `.` and `..` are then collapsed lexically.
fn resolve(path: &str) -> Result<PathBuf, TrackerError> {
    let absolute = match normalize_path(path) {
        Ok(key) => PathBuf::from(key),
        Err(PathError::Relative(relative)) => std::path::absolute(relative)?,
        Err(e) => return Err(e.into()),
    };
    Ok(collapse_dots(&absolute))
}

fn collapse_dots(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` above the root stays at the root
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn path_key(path: &Path) -> Result<String, TrackerError> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| PathError::NotUtf8(path.to_string_lossy().into_owned()).into())
}
