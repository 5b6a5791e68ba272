//! calsync configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::authorization::DEFAULT_AUTH_TIMEOUT;
use crate::date_window::DEFAULT_WINDOW_DAYS;
use crate::error::{CalSyncError, CalSyncResult};

static DEFAULT_CALENDAR_DIR: &str = "~/calendars";

fn default_calendar_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CALENDAR_DIR)
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

fn default_auth_timeout_secs() -> u64 {
    DEFAULT_AUTH_TIMEOUT.as_secs()
}

/// Configuration at ~/.config/calsync/config.toml, overridable through
/// `CALSYNC_*` environment variables (e.g. `CALSYNC_CALENDAR_DIR`).
#[derive(Debug, Deserialize, Clone)]
pub struct CalsyncConfig {
    /// Root of the local calendar store
    #[serde(default = "default_calendar_dir")]
    pub calendar_dir: PathBuf,

    #[serde(default = "default_window_days")]
    pub window_days: u32,

    #[serde(default = "default_auth_timeout_secs")]
    pub auth_timeout_secs: u64,
}

impl Default for CalsyncConfig {
    fn default() -> Self {
        CalsyncConfig {
            calendar_dir: default_calendar_dir(),
            window_days: default_window_days(),
            auth_timeout_secs: default_auth_timeout_secs(),
        }
    }
}

impl CalsyncConfig {
    pub fn config_path() -> CalSyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalSyncError::Config("Could not determine config directory".into()))?
            .join("calsync");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> CalSyncResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path` (if it exists) layered under the environment.
    pub fn load_from(path: &Path) -> CalSyncResult<Self> {
        let config: CalsyncConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("CALSYNC").try_parsing(true))
            .build()
            .map_err(|e| CalSyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalSyncError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CalSyncResult<()> {
        if self.window_days == 0 {
            return Err(CalSyncError::Config("window_days must be at least 1".into()));
        }
        if self.auth_timeout_secs == 0 {
            return Err(CalSyncError::Config(
                "auth_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// `calendar_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.calendar_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config = CalsyncConfig::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.window_days, 30);
        assert_eq!(config.auth_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_file_values_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "calendar_dir = \"/srv/calendars\"\nwindow_days = 14\nauth_timeout_secs = 5\n",
        )
        .unwrap();

        let config = CalsyncConfig::load_from(&path).unwrap();

        assert_eq!(config.data_path(), PathBuf::from("/srv/calendars"));
        assert_eq!(config.window_days, 14);
        assert_eq!(config.auth_timeout_secs, 5);
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "window_days = 0\n").unwrap();

        let err = CalsyncConfig::load_from(&path).unwrap_err();

        assert!(matches!(err, CalSyncError::Config(_)));
    }

    #[test]
    fn test_tilde_is_expanded() {
        let config = CalsyncConfig::default();

        assert!(!config.data_path().to_string_lossy().starts_with('~'));
    }
}
