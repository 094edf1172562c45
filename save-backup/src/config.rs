//! Configuration management for the save backup engine.
//!
//! Loads the settings record from `config.json` (or a TOML file), validates it
//! once, and resolves relative paths against an immutable [`BaseDir`].

use crate::utils::errors::{BackupError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Accepted backup interval, in minutes (inclusive).
pub const MIN_INTERVAL_MINUTES: u32 = 5;
pub const MAX_INTERVAL_MINUTES: u32 = 60;

/// Default configuration file name, looked up in the base directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding the game's save files
    #[serde(default)]
    pub save_path: String,

    /// Directory receiving archives (empty = base directory)
    #[serde(default)]
    pub out_path: String,

    /// Minutes between backup cycles
    pub interval: u32,

    /// Image name of the game process
    #[serde(default = "default_process_name")]
    pub process_name: String,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default values
fn default_process_name() -> String {
    "Medieval_Dynasty-Win64-Shipping.exe".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Directory that relative configuration paths are resolved against.
///
/// Resolved once at startup; the process working directory is never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDir(PathBuf);

impl BaseDir {
    /// Use `path` as the base, made absolute against the current directory.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let path = if path.is_absolute() {
            path
        } else {
            std::env::current_dir()?.join(path)
        };
        Ok(Self(path))
    }

    /// The directory containing the running executable.
    pub fn from_executable() -> Result<Self> {
        let exe = std::env::current_exe()?;
        let dir = exe.parent().ok_or_else(|| {
            BackupError::Config(format!(
                "executable path {} has no parent directory",
                exe.display()
            ))
        })?;
        Self::new(dir)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Join `path` onto the base unless it is already absolute.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.0.join(path)
        }
    }
}

/// Validated, immutable settings consumed by the scheduler.
#[derive(Debug, Clone)]
pub struct Settings {
    pub save_dir: PathBuf,
    pub out_dir: PathBuf,
    pub interval: Duration,
    pub process_name: String,
}

impl Settings {
    pub fn interval_minutes(&self) -> u64 {
        self.interval.as_secs() / 60
    }

    /// Create the output directory (and parents) if it does not exist yet.
    pub fn prepare_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.out_dir)?;
        Ok(())
    }
}

impl Config {
    /// Load configuration from a JSON or TOML file, chosen by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BackupError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            toml::from_str(&content).map_err(|e| {
                BackupError::Config(format!("invalid TOML in {}: {}", path.display(), e))
            })
        } else {
            serde_json::from_str(&content).map_err(|e| {
                BackupError::Config(format!("invalid JSON in {}: {}", path.display(), e))
            })
        }
    }

    /// Check the record and resolve its paths. Touches no filesystem state.
    pub fn validate(&self, base: &BaseDir) -> Result<Settings> {
        if self.save_path.is_empty() {
            return Err(BackupError::Config("Save path is empty.".to_string()));
        }

        if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&self.interval) {
            return Err(BackupError::Config(format!(
                "Interval must be between {} and {}.",
                MIN_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES
            )));
        }

        if self.process_name.is_empty() {
            return Err(BackupError::Config("Process name is empty.".to_string()));
        }

        let out_dir = if self.out_path.is_empty() {
            base.path().to_path_buf()
        } else {
            base.resolve(&self.out_path)
        };

        Ok(Settings {
            save_dir: base.resolve(&self.save_path),
            out_dir,
            interval: Duration::from_secs(u64::from(self.interval) * 60),
            process_name: self.process_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(save_path: &str, out_path: &str, interval: u32) -> Config {
        Config {
            save_path: save_path.to_string(),
            out_path: out_path.to_string(),
            interval,
            process_name: default_process_name(),
            log: LogConfig::default(),
        }
    }

    #[test]
    fn test_load_original_json_format() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"savePath": "./saves", "outPath": "", "interval": 10}"#,
        )?;

        let config = Config::from_file(&path)?;
        assert_eq!(config.save_path, "./saves");
        assert_eq!(config.out_path, "");
        assert_eq!(config.interval, 10);
        assert_eq!(config.process_name, "Medieval_Dynasty-Win64-Shipping.exe");
        assert_eq!(config.log.level, "info");
        Ok(())
    }

    #[test]
    fn test_load_toml() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("backup.toml");
        fs::write(
            &path,
            "savePath = \"saves\"\ninterval = 15\nprocessName = \"game.exe\"\n\n[log]\nlevel = \"debug\"\n",
        )?;

        let config = Config::from_file(&path)?;
        assert_eq!(config.interval, 15);
        assert_eq!(config.process_name, "game.exe");
        assert_eq!(config.log.level, "debug");
        Ok(())
    }

    #[test]
    fn test_unparsable_file_is_config_error() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json")?;

        assert!(matches!(Config::from_file(&path), Err(BackupError::Config(_))));
        assert!(matches!(
            Config::from_file(&dir.path().join("missing.json")),
            Err(BackupError::Config(_))
        ));
        Ok(())
    }

    #[test]
    fn test_interval_bounds() {
        let base = BaseDir::new("/opt/backup").unwrap();
        for ok in [5, 30, 60] {
            assert!(config("saves", "", ok).validate(&base).is_ok(), "{ok}");
        }
        for bad in [0, 4, 61, 1000] {
            assert!(
                matches!(config("saves", "", bad).validate(&base), Err(BackupError::Config(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_empty_save_path_rejected_without_creating_output() -> Result<()> {
        let dir = TempDir::new()?;
        let base = BaseDir::new(dir.path())?;

        let result = config("", "archives", 10).validate(&base);
        assert!(matches!(result, Err(BackupError::Config(_))));
        assert!(!dir.path().join("archives").exists());
        Ok(())
    }

    #[test]
    #[cfg(unix)]
    fn test_paths_resolve_against_base() {
        let base = BaseDir::new("/opt/backup").unwrap();

        let settings = config("./saves", "", 10).validate(&base).unwrap();
        assert_eq!(settings.save_dir, Path::new("/opt/backup/./saves"));
        assert_eq!(settings.out_dir, Path::new("/opt/backup"));
        assert_eq!(settings.interval, Duration::from_secs(600));
        assert_eq!(settings.interval_minutes(), 10);

        let settings = config("/games/saves", "backups", 5).validate(&base).unwrap();
        assert_eq!(settings.save_dir, Path::new("/games/saves"));
        assert_eq!(settings.out_dir, Path::new("/opt/backup/backups"));
    }

    #[test]
    fn test_prepare_output_dir_creates_parents() -> Result<()> {
        let dir = TempDir::new()?;
        let base = BaseDir::new(dir.path())?;
        let settings = config("saves", "a/b/c", 10).validate(&base)?;

        settings.prepare_output_dir()?;
        assert!(dir.path().join("a/b/c").is_dir());
        Ok(())
    }
}
