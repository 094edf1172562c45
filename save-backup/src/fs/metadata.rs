//! File metadata captured for archive entry headers.
//!
//! Save files keep their modification time and permission bits inside the
//! archive so a restore looks like the original.

use chrono::{DateTime, Datelike, Local, Timelike};
use std::fs::File;
use std::time::SystemTime;

/// Metadata of one source file, read from an open handle
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// File size in bytes
    pub size: u64,

    /// Last modified time, if the platform reports one
    pub modified: Option<SystemTime>,

    /// File permissions (Unix mode bits)
    pub permissions: Option<u32>,
}

impl FileMetadata {
    /// Extract metadata from an already opened file
    pub fn from_file(file: &File) -> std::io::Result<Self> {
        let metadata = file.metadata()?;

        #[cfg(unix)]
        let permissions = {
            use std::os::unix::fs::PermissionsExt;
            Some(metadata.permissions().mode())
        };

        #[cfg(not(unix))]
        let permissions = None;

        Ok(Self {
            size: metadata.len(),
            modified: metadata.modified().ok(),
            permissions,
        })
    }

    /// Modification time in the zip DOS format (local time, 1980..=2107).
    ///
    /// Returns `None` when the time is unknown or outside the DOS range.
    pub fn zip_modified(&self) -> Option<zip::DateTime> {
        let local: DateTime<Local> = self.modified?.into();
        let year = u16::try_from(local.year()).ok()?;
        zip::DateTime::from_date_and_time(
            year,
            local.month() as u8,
            local.day() as u8,
            local.hour() as u8,
            local.minute() as u8,
            local.second() as u8,
        )
        .ok()
    }
}
