//! # Persistent Settings Store
//!
//! Key/value JSON settings owned by the host. The reminder store keeps its
//! `reminders` and `unspec` lists here and nowhere else.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: File store re-reads on every access and writes through a temp file
//! - 1.0.0: Initial release with in-memory and JSON file stores

use dashmap::DashMap;
use log::debug;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::core::Result;

/// Durable key/value settings provided by the host
pub trait SettingsStore: Send + Sync {
    /// Read a value, `None` when the key was never set
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace a value; must be durable when this returns
    fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// Volatile store for tests and embedding hosts that persist elsewhere
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: DashMap<String, Value>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Settings object persisted as a single JSON file
#[derive(Debug)]
pub struct JsonFileSettings {
    path: PathBuf,
    // Serializes read-modify-write of the file
    write_lock: Mutex<()>,
}

impl JsonFileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, values: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(values)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileSettings {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut values = self.read_all()?;
        Ok(values.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value);
        self.write_all(&values)?;
        debug!("Persisted settings key '{}' to {}", key, self.path.display());
        Ok(())
    }
}
