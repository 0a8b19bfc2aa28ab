//! # ftrack-shell
//!
//! Everything between a front end and the ledger that touches the
//! machine: whether a folder still exists, launching the platform file
//! browser, the per-user data directory, and the sidecar UI state.
//!
//! Front ends drive [`Tracker`], which applies one rule before every
//! open: a path that no longer exists is removed from the history
//! instead of being opened.

pub mod app_paths;
pub mod launcher;
pub mod probe;
pub mod tracker;
pub mod ui_state;

pub use app_paths::AppPaths;
pub use launcher::{folder_to_open, Launcher, SystemLauncher};
pub use probe::{FsProbe, PathProbe};
pub use tracker::{OpenOutcome, Tracker};
pub use ui_state::{ScrollPosition, UiState};
