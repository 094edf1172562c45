//! Zip archive creation.
//!
//! Archives are written to a temporary file next to the destination and
//! renamed into place once complete, so a failed run never leaves a partial
//! archive under the final name.

pub mod naming;

use crate::fs::metadata::FileMetadata;
use crate::utils::errors::{BackupError, Result};
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub use naming::{generate_archive_name, unique_archive_path};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Entries at or above this size need zip64 headers.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Create a flat zip at `destination` holding every file in `files`.
///
/// Entries are stored under their base name with Deflate compression. The
/// parent directory of `destination` must already exist. An existing file at
/// `destination` is never overwritten.
pub fn create_archive<P: AsRef<Path>>(files: &[P], destination: &Path) -> Result<()> {
    let create_error = |source: std::io::Error| BackupError::Create {
        path: destination.to_path_buf(),
        source,
    };

    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let temp = tempfile::Builder::new()
        .prefix(".md_save_backup_")
        .suffix(".zip.partial")
        .tempfile_in(parent)
        .map_err(create_error)?;

    let mut zip = ZipWriter::new(temp);
    for path in files {
        add_file(&mut zip, path.as_ref())?;
    }

    let temp = zip.finish().map_err(|e| BackupError::ArchiveWrite {
        path: destination.to_path_buf(),
        source: e,
    })?;
    temp.as_file().sync_all().map_err(create_error)?;
    temp.persist_noclobber(destination)
        .map_err(|e| create_error(e.error))?;

    debug!(
        destination = %destination.display(),
        entries = files.len(),
        "Archive written"
    );
    Ok(())
}

/// Append one file to the archive under its base name
fn add_file<W: Write + std::io::Seek>(zip: &mut ZipWriter<W>, path: &Path) -> Result<()> {
    let source_error = |source: std::io::Error| BackupError::SourceRead {
        path: path.to_path_buf(),
        source,
    };
    let write_error = |source: zip::result::ZipError| BackupError::ArchiveWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(source_error)?;
    let metadata = FileMetadata::from_file(&file).map_err(source_error)?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            source_error(std::io::Error::new(
                ErrorKind::InvalidInput,
                "path has no file name",
            ))
        })?;

    let mut options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(metadata.size >= ZIP64_THRESHOLD);
    if let Some(modified) = metadata.zip_modified() {
        options = options.last_modified_time(modified);
    }
    if let Some(mode) = metadata.permissions {
        options = options.unix_permissions(mode);
    }

    zip.start_file(name, options).map_err(write_error)?;

    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(source_error(e)),
        };
        zip.write_all(&buf[..n])
            .map_err(|e| write_error(e.into()))?;
    }

    Ok(())
}
