//! Save Backup - Main entry point
//!
//! Zips the game's save directory every few minutes while the game is running.

use anyhow::{Context, Result};
use clap::Parser;
use save_backup::config::{BaseDir, Config, DEFAULT_CONFIG_FILE};
use save_backup::daemon::shutdown::ShutdownCoordinator;
use save_backup::{process, utils, Scheduler};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (JSON or TOML), relative to the base directory
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory relative paths resolve against (default: the executable's directory)
    #[arg(short, long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let base = match args.base_dir {
        Some(dir) => BaseDir::new(dir)?,
        None => BaseDir::from_executable()?,
    };

    // Load and validate configuration before anything touches the disk
    let config_path = base.resolve(&args.config);
    let config = Config::from_file(&config_path)?;

    let log_level = args.log_level.as_deref().unwrap_or(&config.log.level);
    utils::logger::init(log_level)?;

    let settings = config.validate(&base)?;
    settings
        .prepare_output_dir()
        .with_context(|| format!("creating {}", settings.out_dir.display()))?;

    tracing::info!(
        "Starting save-backup v{} (watching {})",
        env!("CARGO_PKG_VERSION"),
        settings.process_name
    );
    let out_dir = std::path::absolute(&settings.out_dir)?;
    tracing::info!(
        "Saves will be backed up every {} minutes to \"{}\".",
        settings.interval_minutes(),
        out_dir.display()
    );

    let shutdown_coordinator = ShutdownCoordinator::new();
    let scheduler = Scheduler::new(settings, process::default_checker());
    let mut backup_loop = tokio::spawn(scheduler.run(shutdown_coordinator.subscribe()));

    tokio::select! {
        joined = &mut backup_loop => {
            // Only a fatal cycle error ends the loop on its own
            joined.context("backup loop panicked")??;
            return Ok(());
        }
        res = shutdown_coordinator.wait_for_signal() => {
            res.context("installing signal handlers")?;
        }
    }

    backup_loop.await.context("backup loop panicked")??;
    tracing::info!("Shutdown complete");

    Ok(())
}
