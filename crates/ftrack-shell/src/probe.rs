//! Filesystem existence checks.

use std::path::Path;

/// Answers whether a recorded path is still there.
pub trait PathProbe {
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
}

/// Probe backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}
