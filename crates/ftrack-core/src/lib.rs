//! # ftrack-core
//!
//! Core types, path rules, and view ordering for the ftrack folder history.
//!
//! This crate defines the foundational types used across all other ftrack crates:
//! - [`PathRecord`] — one visited folder with its counters
//! - [`SortKey`] — the orderings a history view can be requested in
//! - [`normalize_path`] — the validation every stored path passes through
//! - [`order_view`] — the pinned-first ordering rule
//! - Timestamp helpers ([`time`])
//! - Error hierarchy ([`TrackerError`], [`PathError`])

pub mod error;
pub mod path;
pub mod record;
pub mod time;
pub mod view;

pub use error::{PathError, Result, TrackerError};
pub use path::normalize_path;
pub use record::{PathRecord, SortKey};
pub use view::order_view;
