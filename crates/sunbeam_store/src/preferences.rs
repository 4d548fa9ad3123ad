use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sunbeam_protocol::ParamValue;

use crate::error::StoreError;
use crate::json_file;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceEntry {
    pub origin: String,
    #[serde(default)]
    pub preferences: BTreeMap<String, ParamValue>,
}

/// Preferences entered in the launcher, keyed by extension alias.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    entries: BTreeMap<String, PreferenceEntry>,
}

impl PreferenceStore {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            path: path.to_path_buf(),
            entries: json_file::read(path)?,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored values for `alias`, unless they were saved for another origin.
    #[must_use]
    pub fn get(&self, alias: &str, origin: &str) -> Option<&BTreeMap<String, ParamValue>> {
        self.entries
            .get(alias)
            .filter(|entry| entry.origin == origin)
            .map(|entry| &entry.preferences)
    }

    pub fn set(
        &mut self,
        alias: impl Into<String>,
        origin: impl Into<String>,
        preferences: BTreeMap<String, ParamValue>,
    ) {
        self.entries.insert(
            alias.into(),
            PreferenceEntry {
                origin: origin.into(),
                preferences,
            },
        );
    }

    pub fn save(&self) -> Result<(), StoreError> {
        json_file::write(&self.path, &self.entries)
    }
}
