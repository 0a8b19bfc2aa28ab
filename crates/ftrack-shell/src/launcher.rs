//! Opening folders in the platform file browser.
//!
//! Launching is fire-and-forget: the child process is spawned and reaped
//! on a detached thread, and nothing waits for the browser to appear.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use ftrack_core::error::TrackerError;

use crate::probe::PathProbe;

/// Something that can show a folder to the user.
pub trait Launcher {
    /// Start showing `folder`. Must not block on the external program.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Launch`] if the program cannot be started.
    fn launch(&self, folder: &Path) -> Result<(), TrackerError>;
}

/// Launches `explorer`, `open` or `xdg-open`, or a configured command.
#[derive(Debug, Clone, Default)]
pub struct SystemLauncher {
    program: Option<String>,
}

impl SystemLauncher {
    /// Use `program` instead of the platform default when given.
    #[must_use]
    pub fn new(program: Option<String>) -> Self {
        Self {
            program: program.filter(|p| !p.trim().is_empty()),
        }
    }

    pub fn program(&self) -> &str {
        self.program.as_deref().unwrap_or(default_program())
    }
}

fn default_program() -> &'static str {
    if cfg!(windows) {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

impl Launcher for SystemLauncher {
    fn launch(&self, folder: &Path) -> Result<(), TrackerError> {
        let program = self.program();
        let mut child = Command::new(program)
            .arg(folder)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| TrackerError::Launch(format!("{program} {}: {e}", folder.display())))?;

        tracing::debug!(program, folder = %folder.display(), pid = child.id(), "launched file browser");
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

/// The folder to show for `path`: a file opens its containing folder.
pub fn folder_to_open(path: &Path, probe: &impl PathProbe) -> PathBuf {
    if probe.is_file(path) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            return parent.to_path_buf();
        }
    }
    path.to_path_buf()
}
