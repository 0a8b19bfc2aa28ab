//! Error types for ftrack.

use thiserror::Error;

/// Top-level result type for ftrack operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Top-level error type for ftrack.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    /// The history store could not be opened, created, or migrated.
    /// Fatal: no ledger is handed out in this case.
    #[error("storage initialization failed: {0}")]
    StorageInit(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid sort key '{0}': expected frequency, recency, or path")]
    InvalidSortKey(String),

    #[error("invalid timestamp: {0}")]
    Timestamp(String),

    #[error("launch error: {0}")]
    Launch(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Reasons a path string is refused before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("REJECTED: path is empty")]
    Empty,

    #[error("REJECTED: path contains a NUL byte")]
    ContainsNul,

    #[error("REJECTED: path '{0}' is not absolute")]
    Relative(String),

    #[error("REJECTED: path '{0}' is not valid UTF-8")]
    NotUtf8(String),
}
