//! Flat key-value persistence under the user config directory.
//!
//! The editor keeps its durable odds and ends (draft text, last path,
//! settings blob) in a single JSON object on disk. Writes are best-effort:
//! a full disk or unwritable directory must never take the editor down,
//! so write failures are swallowed and the in-memory map stays
//! authoritative for the rest of the session.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key for the debounced draft of the edit surface.
pub const KEY_DRAFT_CONTENT: &str = "draft-content";
/// Key for the most recently used file path.
pub const KEY_DRAFT_PATH: &str = "draft-path";
/// Key for the serialized settings record.
pub const KEY_SETTINGS: &str = "app-settings";

pub struct PersistentStore {
    values: HashMap<String, String>,
    store_path: PathBuf,
}

impl PersistentStore {
    /// Open the store backing file, creating the directory if needed.
    /// Missing or unparseable files start the store empty.
    pub fn new(config_dir: &Path) -> Self {
        let store_path = config_dir.join("store.json");

        let values = fs::read_to_string(&store_path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();

        Self { values, store_path }
    }

    /// Store location derived from the platform config directory.
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jotter")
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
        self.write_through();
    }

    pub fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.write_through();
        }
    }

    fn write_through(&self) {
        if let Some(parent) = self.store_path.parent() {
            if !parent.exists() && fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        if let Ok(raw) = serde_json::to_string_pretty(&self.values) {
            // Best-effort cache: an unwritable store is not an error.
            let _ = fs::write(&self.store_path, raw);
        }
    }
}
