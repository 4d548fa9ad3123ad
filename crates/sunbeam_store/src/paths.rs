use std::env;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

pub const APP_DIR: &str = "sunbeam";
pub const CONFIG_FILE: &str = "sunbeam.json";
pub const PREFERENCES_FILE: &str = "preferences.json";
pub const HISTORY_FILE: &str = "history.json";
pub const LOG_FILE: &str = "sunbeam.log";

/// Files the launcher reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub config: PathBuf,
    pub preferences: PathBuf,
    pub history: PathBuf,
    pub log: PathBuf,
}

impl StorePaths {
    /// XDG locations, falling back to `~/.config`, `~/.local/share` and
    /// `~/.cache`.
    pub fn from_env() -> Result<Self, StoreError> {
        let home = dirs::home_dir().ok_or(StoreError::MissingHomeDir)?;
        Ok(Self::under(
            &xdg_dir("XDG_CONFIG_HOME", &home, ".config"),
            &xdg_dir("XDG_DATA_HOME", &home, ".local/share"),
            &xdg_dir("XDG_CACHE_HOME", &home, ".cache"),
        ))
    }

    #[must_use]
    pub fn under(config_home: &Path, data_home: &Path, cache_home: &Path) -> Self {
        Self {
            config: config_home.join(APP_DIR).join(CONFIG_FILE),
            preferences: data_home.join(APP_DIR).join(PREFERENCES_FILE),
            history: cache_home.join(APP_DIR).join(HISTORY_FILE),
            log: cache_home.join(APP_DIR).join(LOG_FILE),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = config.into();
        self
    }
}

fn xdg_dir(var: &str, home: &Path, fallback: &str) -> PathBuf {
    match env::var_os(var) {
        Some(value) if Path::new(&value).is_absolute() => PathBuf::from(value),
        _ => home.join(fallback),
    }
}
