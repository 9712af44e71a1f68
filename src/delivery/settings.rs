//! Webhook settings persistence
//!
//! Settings live in a flat string key/value store under fixed key names.
//! Writes are read-modify-write with last-write-wins semantics; there is no
//! versioning. The dispatcher loads a fresh [`WebhookSettings`] snapshot for
//! every completed artifact, so edits apply from the next photo or clip on.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{Result, SettingsError};

pub const WEBHOOK_AUDIO_URL_KEY: &str = "webhook_audio_url";
pub const WEBHOOK_PHOTO_URL_KEY: &str = "webhook_photo_url";
pub const WEBHOOK_AUDIO_ENABLED_KEY: &str = "webhook_audio_enabled";
pub const WEBHOOK_PHOTO_ENABLED_KEY: &str = "webhook_photo_enabled";

/// String key/value store
pub trait SettingsStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Read several values from one consistent view of the store
    ///
    /// The default reads keys one by one; stores that can snapshot should
    /// override it.
    fn get_many(&self, keys: &[&str]) -> Vec<Option<String>> {
        keys.iter().map(|key| self.get(key)).collect()
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_many(&self, keys: &[&str]) -> Vec<Option<String>> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        keys.iter().map(|key| values.get(*key).cloned()).collect()
    }
}

/// JSON file backed store
///
/// The whole file is a single JSON object of string values. Every `set`
/// re-reads the file, updates one key and writes it back.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileStore {
    /// Open a store at `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> std::result::Result<HashMap<String, String>, SettingsError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SettingsStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.get_many(&[key]).pop().flatten()
    }

    fn get_many(&self, keys: &[&str]) -> Vec<Option<String>> {
        let _guard = self.lock.read().unwrap_or_else(|e| e.into_inner());
        match self.load() {
            Ok(mut values) => keys.iter().map(|key| values.remove(*key)).collect(),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read settings"
                );
                vec![None; keys.len()]
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.write().unwrap_or_else(|e| e.into_inner());
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());

        let json = serde_json::to_vec_pretty(&values).map_err(SettingsError::from)?;
        std::fs::write(&self.path, json).map_err(SettingsError::from)?;
        Ok(())
    }
}

/// Webhook endpoints and toggles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookSettings {
    pub audio_url: String,
    pub photo_url: String,
    pub audio_enabled: bool,
    pub photo_enabled: bool,
}

impl WebhookSettings {
    /// Read the current settings; missing keys take their defaults
    ///
    /// All four keys come from a single store read.
    pub fn load(store: &dyn SettingsStore) -> Self {
        let mut values = store
            .get_many(&[
                WEBHOOK_AUDIO_URL_KEY,
                WEBHOOK_PHOTO_URL_KEY,
                WEBHOOK_AUDIO_ENABLED_KEY,
                WEBHOOK_PHOTO_ENABLED_KEY,
            ])
            .into_iter();
        let mut next = || values.next().flatten();

        let audio_url = next().unwrap_or_default();
        let photo_url = next().unwrap_or_default();
        let audio_enabled = next().as_deref() == Some("true");
        let photo_enabled = next().as_deref() == Some("true");

        Self {
            audio_url,
            photo_url,
            audio_enabled,
            photo_enabled,
        }
    }

    /// Write every field back to the store
    pub fn save(&self, store: &dyn SettingsStore) -> Result<()> {
        store.set(WEBHOOK_AUDIO_URL_KEY, &self.audio_url)?;
        store.set(WEBHOOK_PHOTO_URL_KEY, &self.photo_url)?;
        store.set(WEBHOOK_AUDIO_ENABLED_KEY, bool_str(self.audio_enabled))?;
        store.set(WEBHOOK_PHOTO_ENABLED_KEY, bool_str(self.photo_enabled))?;
        Ok(())
    }

    /// Photo endpoint, if enabled and set
    pub fn photo_target(&self) -> Option<&str> {
        target(self.photo_enabled, &self.photo_url)
    }

    /// Audio endpoint, if enabled and set
    pub fn audio_target(&self) -> Option<&str> {
        target(self.audio_enabled, &self.audio_url)
    }
}

fn target(enabled: bool, url: &str) -> Option<&str> {
    let url = url.trim();
    if enabled && !url.is_empty() {
        Some(url)
    } else {
        None
    }
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}
