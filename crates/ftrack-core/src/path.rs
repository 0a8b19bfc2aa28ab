//! Path validation and normalization.
//!
//! The ledger never touches the filesystem, so these rules are purely
//! lexical: a stored path is non-empty, absolute, free of NUL bytes and
//! carries no trailing separator (a bare root keeps its own).

use crate::error::PathError;
use std::path::Path;

/// Validate and normalize a folder path for use as a ledger key.
///
/// # Errors
///
/// Returns [`PathError`] if the path is empty, contains NUL, or is relative.
pub fn normalize_path(raw: &str) -> Result<String, PathError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PathError::Empty);
    }
    if trimmed.contains('\0') {
        return Err(PathError::ContainsNul);
    }
    if !looks_absolute(trimmed) {
        return Err(PathError::Relative(trimmed.to_string()));
    }
    Ok(strip_trailing_separators(trimmed).to_string())
}

/// Absolute on the host, or absolute in either Unix or Windows form.
///
/// Histories are plain text and may be carried between machines, so a
/// `C:\` path stays valid on Linux and a `/home` path on Windows.
fn looks_absolute(path: &str) -> bool {
    Path::new(path).is_absolute()
        || path.starts_with('/')
        || path.starts_with("\\\\")
        || has_drive_root(path)
}

fn has_drive_root(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && is_separator(bytes[2] as char)
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn strip_trailing_separators(path: &str) -> &str {
    let stripped = path.trim_end_matches(is_separator);
    if stripped.is_empty() {
        // "/" or "\\"
        return &path[..1];
    }
    if stripped.len() == 2 && stripped.as_bytes()[1] == b':' {
        // "C:\" keeps its root separator
        return &path[..3];
    }
    stripped
}
