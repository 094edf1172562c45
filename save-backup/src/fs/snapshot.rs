//! Snapshot of the save directory.
//!
//! Lists the files sitting directly inside the save directory. Nothing below
//! the first level is collected.

use crate::utils::errors::{BackupError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Collect the paths of all non-directory entries directly under `dir`.
///
/// # Returns
/// * `Ok(Vec<PathBuf>)` - Paths joined onto `dir`, sorted by file name (may be empty)
/// * `Err(BackupError::DirectoryRead)` - `dir` is missing, unreadable, or not a directory
///
/// # Example
/// ```no_run
/// use save_backup::fs::snapshot::collect_files;
/// use std::path::Path;
///
/// let files = collect_files(Path::new("./saves")).unwrap();
/// println!("Found {} save files", files.len());
/// ```
pub fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_error = |source: std::io::Error| BackupError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };

    let metadata = std::fs::metadata(dir).map_err(read_error)?;
    if !metadata.is_dir() {
        return Err(read_error(std::io::Error::new(
            std::io::ErrorKind::Other,
            "not a directory",
        )));
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| read_error(e.into()))?;

        if is_file_like(&entry) {
            files.push(entry.path().to_path_buf());
        }
    }

    debug!(dir = %dir.display(), count = files.len(), "Collected save snapshot");
    Ok(files)
}

/// Non-directory check. Symlinks are resolved so links to directories and
/// broken links are left out.
fn is_file_like(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        return false;
    }
    if !file_type.is_symlink() {
        return true;
    }

    match std::fs::metadata(entry.path()) {
        Ok(target) if target.is_dir() => {
            warn!(path = %entry.path().display(), "Skipping symlink to directory");
            false
        }
        Ok(_) => true,
        Err(e) => {
            warn!(path = %entry.path().display(), error = %e, "Skipping broken symlink");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let files = collect_files(temp_dir.path())?;
        assert!(files.is_empty());
        Ok(())
    }

    #[test]
    fn test_collects_files_sorted() -> Result<()> {
        let temp_dir = TempDir::new()?;

        fs::write(temp_dir.path().join("b.txt"), b"content2")?;
        fs::write(temp_dir.path().join("a.txt"), b"content1")?;

        let files = collect_files(temp_dir.path())?;
        assert_eq!(
            files,
            vec![temp_dir.path().join("a.txt"), temp_dir.path().join("b.txt")]
        );

        Ok(())
    }

    #[test]
    fn test_subdirectories_not_descended() -> Result<()> {
        let temp_dir = TempDir::new()?;

        fs::create_dir(temp_dir.path().join("subdir"))?;
        fs::write(temp_dir.path().join("file1.txt"), b"content1")?;
        fs::write(temp_dir.path().join("subdir/file2.txt"), b"content2")?;

        let files = collect_files(temp_dir.path())?;
        assert_eq!(files, vec![temp_dir.path().join("file1.txt")]);

        Ok(())
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        match collect_files(&missing) {
            Err(BackupError::DirectoryRead { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected DirectoryRead, got {other:?}"),
        }
    }

    #[test]
    fn test_file_instead_of_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file = temp_dir.path().join("save.sav");
        fs::write(&file, b"x")?;

        assert!(matches!(
            collect_files(&file),
            Err(BackupError::DirectoryRead { .. })
        ));
        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn test_symlinks() -> Result<()> {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new()?;
        let saves = temp_dir.path().join("saves");
        fs::create_dir(&saves)?;
        fs::create_dir(temp_dir.path().join("other"))?;
        fs::write(temp_dir.path().join("real.sav"), b"data")?;

        symlink(temp_dir.path().join("real.sav"), saves.join("linked.sav"))?;
        symlink(temp_dir.path().join("other"), saves.join("dir_link"))?;
        symlink(temp_dir.path().join("gone"), saves.join("broken"))?;

        let files = collect_files(&saves)?;
        assert_eq!(files, vec![saves.join("linked.sav")]);
        Ok(())
    }
}
