use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;

use crate::error::StoreError;
use crate::json_file;

/// Last-use timestamps (unix seconds) of root list entries.
#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
    entries: HashMap<String, i64>,
}

impl History {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            path: path.to_path_buf(),
            entries: json_file::read(path)?,
        })
    }

    #[must_use]
    pub fn last_used(&self, id: &str) -> Option<i64> {
        self.entries.get(id).copied()
    }

    pub fn record(&mut self, id: impl Into<String>) {
        self.record_at(id, OffsetDateTime::now_utc().unix_timestamp());
    }

    pub fn record_at(&mut self, id: impl Into<String>, timestamp: i64) {
        self.entries.insert(id.into(), timestamp);
    }

    /// Most recently used first; never-used entries keep their relative order.
    #[must_use]
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match (self.last_used(a), self.last_used(b)) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    pub fn save(&self) -> Result<(), StoreError> {
        json_file::write(&self.path, &self.entries)
    }
}
