//! On-disk state of the launcher: config, extension preferences and history.

mod config;
mod error;
mod history;
mod json_file;
mod paths;
mod preferences;

pub use config::{Config, ExtensionConfig, Oneliner};
pub use error::StoreError;
pub use history::History;
pub use paths::{StorePaths, APP_DIR, CONFIG_FILE, HISTORY_FILE, LOG_FILE, PREFERENCES_FILE};
pub use preferences::{PreferenceEntry, PreferenceStore};
