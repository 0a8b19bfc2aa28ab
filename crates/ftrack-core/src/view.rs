//! The history view ordering rule.
//!
//! Pinned records form a strict prefix in their own pin order; the
//! remaining records follow, sorted by the requested key. The sort is
//! stable, so equal keys keep insertion order in both directions.

use std::cmp::Ordering;

use crate::record::{PathRecord, SortKey};

/// Merge pinned and unpinned records into one ordered view.
///
/// `pinned` must already be in pin order (most recently pinned first);
/// `unpinned` must be in insertion order.
#[must_use]
pub fn order_view(
    pinned: Vec<PathRecord>,
    mut unpinned: Vec<PathRecord>,
    key: SortKey,
    descending: bool,
) -> Vec<PathRecord> {
    debug_assert!(pinned.iter().all(|r| r.is_pinned));
    debug_assert!(unpinned.iter().all(|r| !r.is_pinned));

    unpinned.sort_by(|a, b| {
        let ord = compare(a, b, key);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });

    let mut view = pinned;
    view.extend(unpinned);
    view
}

fn compare(a: &PathRecord, b: &PathRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Frequency => a.access_count.cmp(&b.access_count),
        SortKey::Recency => a.last_access_time.cmp(&b.last_access_time),
        SortKey::Path => a.path.to_lowercase().cmp(&b.path.to_lowercase()),
    }
}
