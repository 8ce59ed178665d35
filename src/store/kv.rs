//! Key-value backends for persisted timer data.
//!
//! The store mirrors the extension storage area: a flat map of string keys to
//! JSON values, read and written a handful of keys at a time.
//!
//! # File Format
//!
//! ```json
//! {
//!   "totalTime": 165,
//!   "records": [{ "date": 1760800000000, "duration": 40, "timestamp": 1760800000000 }]
//! }
//! ```
//!
//! Missing or empty files read as an empty map. Writes go through a temp file
//! and a rename so a crash never leaves a half-written file behind.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Flat JSON key-value storage
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read the requested keys. Absent keys are simply missing from the result.
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError>;

    /// Merge `entries` into the store, replacing existing values
    fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError>;
}

/// Volatile store for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(pick(&values, keys))
    }

    fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned)?;
        values.extend(entries);
        Ok(())
    }
}

/// Store persisted as a single JSON object on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => {
                warn!("Store file {} is not a JSON object, ignoring it", self.path.display());
                Ok(Map::new())
            }
            Err(e) => {
                warn!("Store file {} is corrupt ({}), ignoring it", self.path.display(), e);
                Ok(Map::new())
            }
        }
    }

    fn write_all(&self, values: &Map<String, Value>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(values)?;

        let parent_dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir).map_err(|e| self.io_error(e))?;

        let mut temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| self.io_error(e))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| self.io_error(e))?;
        temp_file.flush().map_err(|e| self.io_error(e))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        debug!("Wrote store file {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StoreError> {
        let values = self.read_all()?;
        Ok(pick(&values, keys))
    }

    fn set(&self, entries: Map<String, Value>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut values = self.read_all()?;
        values.extend(entries);
        self.write_all(&values)
    }
}

fn pick(values: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
        .collect()
}
