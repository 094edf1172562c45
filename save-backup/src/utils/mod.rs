//! Utility modules for the save backup engine.

pub mod errors;
pub mod logger;

pub use errors::{BackupError, Result};
