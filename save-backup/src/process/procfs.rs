//! Linux process lookup through `/proc`.

use super::ProcessChecker;
use crate::utils::errors::{BackupError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Scans `<proc_root>/<pid>` entries for a matching image name.
///
/// The image name is the base name of `argv[0]`, split on both `/` and `\` so
/// Windows games running under Wine or Proton match their `.exe` name. Kernel
/// threads have no command line and fall back to `comm`.
#[derive(Debug, Clone)]
pub struct ProcfsChecker {
    proc_root: PathBuf,
}

impl ProcfsChecker {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Use a different proc root (tests, containers with a bind-mounted `/proc`).
    pub fn with_root(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }

    /// Image name of one process, or `None` if it exited or is unreadable.
    fn image_name(&self, pid_dir: &Path) -> Option<String> {
        match fs::read(pid_dir.join("cmdline")) {
            Ok(cmdline) => {
                let argv0 = cmdline.split(|b| *b == 0).next().unwrap_or_default();
                if !argv0.is_empty() {
                    let argv0 = String::from_utf8_lossy(argv0);
                    return Some(base_name(&argv0).to_string());
                }
            }
            Err(e) if is_vanished(&e) => return None,
            Err(_) => {}
        }

        fs::read_to_string(pid_dir.join("comm"))
            .ok()
            .map(|comm| comm.trim_end_matches('\n').to_string())
    }
}

impl Default for ProcfsChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessChecker for ProcfsChecker {
    fn is_process_running(&self, name: &str) -> Result<bool> {
        let entries = fs::read_dir(&self.proc_root).map_err(BackupError::Enumeration)?;

        for entry in entries {
            let entry = entry.map_err(BackupError::Enumeration)?;
            let file_name = entry.file_name();
            let Some(pid) = file_name.to_str() else { continue };
            if !pid.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }

            if let Some(image) = self.image_name(&entry.path()) {
                if image == name {
                    trace!(pid, image = %image, "Found matching process");
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}

/// Last path component, accepting both separators.
fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// The process exited between listing and reading.
fn is_vanished(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::NotFound || e.raw_os_error() == Some(3) // ESRCH
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn add_process(root: &Path, pid: &str, cmdline: &[u8], comm: &str) {
        let dir = root.join(pid);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("cmdline"), cmdline).unwrap();
        fs::write(dir.join("comm"), format!("{comm}\n")).unwrap();
    }

    fn fake_proc() -> TempDir {
        let root = TempDir::new().unwrap();
        add_process(root.path(), "1", b"/sbin/init\0splash\0", "systemd");
        add_process(root.path(), "2", b"", "kthreadd");
        add_process(
            root.path(),
            "4242",
            b"Z:\\games\\MD\\Medieval_Dynasty-Win64-Shipping.exe\0-dx12\0",
            "Medieval_Dynas",
        );
        fs::create_dir_all(root.path().join("sys")).unwrap();
        fs::write(root.path().join("uptime"), "1.0 1.0\n").unwrap();
        root
    }

    #[test]
    fn test_matches_windows_path_under_wine() -> Result<()> {
        let root = fake_proc();
        let checker = ProcfsChecker::with_root(root.path());
        assert!(checker.is_process_running("Medieval_Dynasty-Win64-Shipping.exe")?);
        Ok(())
    }

    #[test]
    fn test_matches_unix_argv0_and_comm_fallback() -> Result<()> {
        let root = fake_proc();
        let checker = ProcfsChecker::with_root(root.path());
        assert!(checker.is_process_running("init")?);
        assert!(checker.is_process_running("kthreadd")?);
        Ok(())
    }

    #[test]
    fn test_exact_match_only() -> Result<()> {
        let root = fake_proc();
        let checker = ProcfsChecker::with_root(root.path());
        assert!(!checker.is_process_running("Medieval_Dynasty")?);
        assert!(!checker.is_process_running("medieval_dynasty-win64-shipping.exe")?);
        assert!(!checker.is_process_running("Medieval_Dynas")?);
        Ok(())
    }

    #[test]
    fn test_vanished_process_is_skipped() -> Result<()> {
        let root = fake_proc();
        fs::create_dir_all(root.path().join("999")).unwrap();
        let checker = ProcfsChecker::with_root(root.path());
        assert!(!checker.is_process_running("ghost")?);
        Ok(())
    }

    #[test]
    fn test_unreadable_root_is_enumeration_error() {
        let root = TempDir::new().unwrap();
        let checker = ProcfsChecker::with_root(root.path().join("missing"));
        assert!(matches!(
            checker.is_process_running("game.exe"),
            Err(BackupError::Enumeration(_))
        ));
    }

    #[test]
    fn test_real_proc_finds_current_process() -> Result<()> {
        let exe = std::env::current_exe()?;
        let cmdline = fs::read("/proc/self/cmdline")?;
        let argv0 = String::from_utf8_lossy(cmdline.split(|b| *b == 0).next().unwrap());
        let name = base_name(&argv0).to_string();
        assert!(!name.is_empty(), "{}", exe.display());

        assert!(ProcfsChecker::new().is_process_running(&name)?);
        Ok(())
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("/usr/bin/game"), "game");
        assert_eq!(base_name("C:\\Games\\game.exe"), "game.exe");
        assert_eq!(base_name("game.exe"), "game.exe");
    }
}
