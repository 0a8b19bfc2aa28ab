//! PathRecord — one visited folder in the history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TrackerError;

/// A folder the user has opened at least once. `path` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    pub path: String,
    /// Number of visits; never below 1 while the record exists.
    pub access_count: u64,
    /// Time of the most recent visit, second resolution.
    pub last_access_time: DateTime<Utc>,
    pub is_pinned: bool,
}

/// Ordering applied to the unpinned part of a history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// By `access_count`.
    #[default]
    Frequency,
    /// By `last_access_time`.
    Recency,
    /// By path, case-insensitive.
    Path,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Frequency => "frequency",
            Self::Recency => "recency",
            Self::Path => "path",
        }
    }

    /// The key the "toggle sort" action switches to: frequency and
    /// recency alternate, path falls back to frequency.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Frequency => Self::Recency,
            Self::Recency | Self::Path => Self::Frequency,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frequency" | "freq" | "count" => Ok(Self::Frequency),
            "recency" | "recent" | "time" => Ok(Self::Recency),
            "path" | "name" => Ok(Self::Path),
            other => Err(TrackerError::InvalidSortKey(other.to_string())),
        }
    }
}
