//! User actions shared by both front ends.
//!
//! The one-shot command line and the interactive shell each parse their
//! input into an [`Action`]; [`execute`] is the only place that turns an
//! action into tracker calls.

use std::path::PathBuf;

use ftrack_core::error::TrackerError;
use ftrack_core::{PathRecord, SortKey};
use ftrack_ledger::ImportSummary;
use ftrack_shell::{Launcher, OpenOutcome, PathProbe, Tracker};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Open(String),
    /// Open the folder the previous session ended in.
    OpenLast,
    Visit(String),
    Remove(String),
    Pin(String),
    Unpin(String),
    Clear,
    Prune,
    List { sort: SortKey, descending: bool },
    Import(PathBuf),
}

impl Action {
    /// Whether the action changes the history (front ends re-list after these).
    pub fn mutates(&self) -> bool {
        !matches!(self, Self::List { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Opened(PathRecord),
    Visited(PathRecord),
    Stale(String),
    Removed { path: String, removed: bool },
    Pinned { path: String, changed: bool },
    Unpinned { path: String, changed: bool },
    Cleared,
    Pruned(Vec<String>),
    Listing(Vec<PathRecord>),
    Imported(ImportSummary),
}

impl Reply {
    /// One-line user feedback. Listings are rendered separately.
    pub fn message(&self) -> Option<String> {
        let text = match self {
            Self::Opened(r) => format!("opened {} ({} visits)", r.path, r.access_count),
            Self::Visited(r) => format!("recorded {} ({} visits)", r.path, r.access_count),
            Self::Stale(path) => {
                format!("path no longer exists, removed from history: {path}")
            }
            Self::Removed { path, removed: true } => format!("removed {path}"),
            Self::Removed { path, removed: false } => format!("not in history: {path}"),
            Self::Pinned { path, changed: true } => format!("pinned {path}"),
            Self::Pinned { path, changed: false } => {
                format!("not pinned (unknown or already pinned): {path}")
            }
            Self::Unpinned { path, changed: true } => format!("unpinned {path}"),
            Self::Unpinned { path, changed: false } => format!("not pinned: {path}"),
            Self::Cleared => "history cleared".to_string(),
            Self::Pruned(paths) if paths.is_empty() => "no stale paths".to_string(),
            Self::Pruned(paths) => {
                let mut text = format!("pruned {} stale path(s)", paths.len());
                for p in paths {
                    text.push_str("\n  ");
                    text.push_str(p);
                }
                text
            }
            Self::Imported(s) => format!(
                "imported {} new, merged {} existing, skipped {} invalid",
                s.imported, s.merged, s.skipped
            ),
            Self::Listing(_) => return None,
        };
        Some(text)
    }
}

/// Run one action against the tracker.
///
/// # Errors
///
/// Propagates [`TrackerError`] from the tracker.
pub fn execute<P: PathProbe, L: Launcher>(
    tracker: &mut Tracker<P, L>,
    action: Action,
) -> Result<Reply, TrackerError> {
    tracing::debug!(?action, "executing");
    let reply = match action {
        Action::Open(path) => match tracker.open(&path)? {
            OpenOutcome::Opened(record) => Reply::Opened(record),
            OpenOutcome::Stale(path) => Reply::Stale(path),
        },
        Action::OpenLast => match tracker.open_last()? {
            OpenOutcome::Opened(record) => Reply::Opened(record),
            OpenOutcome::Stale(path) => Reply::Stale(path),
        },
        Action::Visit(path) => match tracker.visit(&path)? {
            OpenOutcome::Opened(record) => Reply::Visited(record),
            OpenOutcome::Stale(path) => Reply::Stale(path),
        },
        Action::Remove(path) => {
            let removed = tracker.remove(&path)?;
            Reply::Removed { path, removed }
        }
        Action::Pin(path) => {
            let changed = tracker.pin(&path)?;
            Reply::Pinned { path, changed }
        }
        Action::Unpin(path) => {
            let changed = tracker.unpin(&path)?;
            Reply::Unpinned { path, changed }
        }
        Action::Clear => {
            tracker.clear()?;
            Reply::Cleared
        }
        Action::Prune => Reply::Pruned(tracker.prune()?),
        Action::List { sort, descending } => Reply::Listing(tracker.view(sort, descending)?),
        Action::Import(source) => Reply::Imported(tracker.import_legacy(&source)?),
    };
    Ok(reply)
}
