//! Process liveness checks.
//!
//! The [`ProcessChecker`] trait hides the one platform-specific piece of the
//! engine. Each supported host gets its own implementation; [`default_checker`]
//! picks the one for the current target.

#[cfg(target_os = "linux")]
pub mod procfs;
#[cfg(windows)]
pub mod toolhelp;

use crate::utils::errors::{BackupError, Result};

/// Answers whether a process with a given image name is running.
///
/// Implementations enumerate the process table on every call and never cache.
pub trait ProcessChecker: Send + Sync {
    /// `Ok(false)` when nothing matches. `Err(BackupError::Enumeration)` when
    /// the process table cannot be read.
    fn is_process_running(&self, name: &str) -> Result<bool>;
}

impl<T: ProcessChecker + ?Sized> ProcessChecker for Box<T> {
    fn is_process_running(&self, name: &str) -> Result<bool> {
        (**self).is_process_running(name)
    }
}

impl<T: ProcessChecker + ?Sized> ProcessChecker for std::sync::Arc<T> {
    fn is_process_running(&self, name: &str) -> Result<bool> {
        (**self).is_process_running(name)
    }
}

/// Fallback for hosts without a process enumeration backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedChecker;

impl ProcessChecker for UnsupportedChecker {
    fn is_process_running(&self, _name: &str) -> Result<bool> {
        Err(BackupError::Enumeration(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "process enumeration is not supported on this platform",
        )))
    }
}

/// The process checker for the current host.
#[cfg(target_os = "linux")]
pub fn default_checker() -> Box<dyn ProcessChecker> {
    Box::new(procfs::ProcfsChecker::new())
}

/// The process checker for the current host.
#[cfg(windows)]
pub fn default_checker() -> Box<dyn ProcessChecker> {
    Box::new(toolhelp::ToolhelpChecker)
}

/// The process checker for the current host.
#[cfg(not(any(target_os = "linux", windows)))]
pub fn default_checker() -> Box<dyn ProcessChecker> {
    Box::new(UnsupportedChecker)
}
