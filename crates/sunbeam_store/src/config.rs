use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sunbeam_protocol::{ParamValue, RootItem};

use crate::error::StoreError;
use crate::json_file;

/// User configuration: installed extensions and one-liners.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extensions: BTreeMap<String, ExtensionConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub oneliners: Vec<Oneliner>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    pub origin: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub preferences: BTreeMap<String, ParamValue>,
    /// Extra root items on top of the manifest's own.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub root: Vec<RootItem>,
}

/// Shell command shown on the root list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Oneliner {
    pub title: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exit: bool,
}

impl Config {
    /// Loads the config file. A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        json_file::read(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        json_file::write(path, self)
    }
}
