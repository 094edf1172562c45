//! Filesystem helpers: save directory snapshots and entry metadata.

pub mod metadata;
pub mod snapshot;
