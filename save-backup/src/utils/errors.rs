//! Custom error types for the save backup engine.
//!
//! Every variant is fatal: the scheduler returns it and the binary exits.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to enumerate running processes: {0}")]
    Enumeration(#[source] io::Error),

    #[error("Failed to read save directory {}: {source}", path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create archive {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read source file {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write archive entry for {}: {source}", path.display())]
    ArchiveWrite {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Backup task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, BackupError>;
