//! The backup loop.
//!
//! Every interval the scheduler checks whether the game is running. If it is,
//! the save directory is snapshotted into a new archive; if not, the cycle is
//! skipped. Cycles never overlap: each one runs to completion on the blocking
//! pool before the next wait starts.

use crate::archive::{create_archive, unique_archive_path};
use crate::config::Settings;
use crate::fs::snapshot::collect_files;
use crate::process::ProcessChecker;
use crate::utils::errors::{BackupError, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the interval to elapse
    Idle,
    CheckingLiveness,
    /// Game not running, nothing to do this cycle
    Skipping,
    Archiving,
}

/// A finished archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    pub name: String,
    pub path: PathBuf,
    pub entries: usize,
}

/// Result of one cycle. A stopped game is a skip, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Skipped,
    Archived(ArchiveReport),
}

struct Inner {
    settings: Settings,
    checker: Box<dyn ProcessChecker>,
    state: watch::Sender<SchedulerState>,
}

/// Periodic backup driver. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    pub fn new(settings: Settings, checker: impl ProcessChecker + 'static) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            inner: Arc::new(Inner {
                settings,
                checker: Box::new(checker),
                state,
            }),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Observe state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<SchedulerState> {
        self.inner.state.subscribe()
    }

    fn set_state(&self, state: SchedulerState) {
        debug!(?state, "Scheduler state");
        self.inner.state.send_replace(state);
    }

    /// Run cycles until `shutdown` fires or a cycle fails.
    ///
    /// The first liveness check happens only after one full interval. Shutdown
    /// is observed while idle, so an archive in progress always completes.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let interval = self.inner.settings.interval;

        loop {
            self.set_state(SchedulerState::Idle);

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.recv() => {
                    info!("Backup loop stopped");
                    return Ok(());
                }
            }

            let cycle = self.clone();
            tokio::task::spawn_blocking(move || cycle.run_cycle())
                .await
                .map_err(|e| BackupError::Task(e.to_string()))??;
        }
    }

    /// One check-and-archive pass, without the preceding wait.
    pub fn run_cycle(&self) -> Result<CycleOutcome> {
        let settings = &self.inner.settings;

        self.set_state(SchedulerState::CheckingLiveness);
        let running = self
            .inner
            .checker
            .is_process_running(&settings.process_name)?;

        let outcome = if running {
            self.set_state(SchedulerState::Archiving);
            CycleOutcome::Archived(self.archive_saves()?)
        } else {
            self.set_state(SchedulerState::Skipping);
            info!("Game isn't running, skipped backup.");
            CycleOutcome::Skipped
        };

        self.set_state(SchedulerState::Idle);
        Ok(outcome)
    }

    fn archive_saves(&self) -> Result<ArchiveReport> {
        let settings = &self.inner.settings;

        let files = collect_files(&settings.save_dir)?;
        let path = unique_archive_path(&settings.out_dir, &chrono::Local::now());
        create_archive(&files, &path)?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("{}", name);

        Ok(ArchiveReport {
            name,
            path,
            entries: files.len(),
        })
    }
}
