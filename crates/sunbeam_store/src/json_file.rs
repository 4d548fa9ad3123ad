use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Reads `path` as JSON. A missing or empty file yields `T::default()`.
pub(crate) fn read<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(error) => return Err(StoreError::io("reading", path, error)),
    };
    if contents.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&contents).map_err(|source| StoreError::json(path, source))
}

/// Writes `value` as pretty JSON through a sibling temp file.
pub(crate) fn write<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|source| StoreError::io("creating directory", parent, source))?;
    }
    let mut encoded = serde_json::to_string_pretty(value)
        .map_err(|source| StoreError::json_serialize(path, source))?;
    encoded.push('\n');

    let temp = path.with_extension("json.tmp");
    fs::write(&temp, encoded).map_err(|source| StoreError::io("writing", &temp, source))?;
    fs::rename(&temp, path).map_err(|source| StoreError::io("replacing", path, source))
}
