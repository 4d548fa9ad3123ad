//! Environment configuration for the terminal layer.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// `NO_COLOR` set to any non-empty value.
    pub no_color: bool,
    /// `SUNBEAM_TUI_WRITE_LOG`: copy of every byte written to the terminal.
    pub tui_write_log: Option<PathBuf>,
    /// `SUNBEAM_LOG_FILE`: tracing output file.
    pub log_file: Option<PathBuf>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            no_color: env_string_opt("NO_COLOR").is_some(),
            tui_write_log: env_string_opt("SUNBEAM_TUI_WRITE_LOG").map(PathBuf::from),
            log_file: env_string_opt("SUNBEAM_LOG_FILE").map(PathBuf::from),
        }
    }

    /// Applies process-wide settings (styling).
    pub fn apply(&self) {
        crate::core::style::set_color_enabled(!self.no_color);
    }
}

/// `true` when `key` is set to `1` or `true`.
pub fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|value| matches!(value.trim(), "1" | "true"))
        .unwrap_or(false)
}

/// Value of `key`, ignoring unset and blank values.
pub fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
