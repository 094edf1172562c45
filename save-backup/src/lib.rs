//! Save Backup Library
//!
//! Periodically zips a game's save directory while the game process is running.

pub mod archive;
pub mod config;
pub mod daemon;
pub mod fs;
pub mod process;
pub mod scheduler;
pub mod utils;

// Re-export commonly used types
pub use config::{BaseDir, Config, Settings};
pub use scheduler::{CycleOutcome, Scheduler};
pub use utils::errors::BackupError;
pub type Result<T> = std::result::Result<T, BackupError>;
