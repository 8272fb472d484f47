//! Key-value storage backends for persisted auth state.
//!
//! The backend is picked once, when the `TokenStore` is built, from a
//! `StorageContext`. Callers never branch on the context afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Entries held by a store, ordered by key.
pub type Entries = BTreeMap<String, String>;

/// Minimal string key-value capability.
///
/// Implementations are total: failures are logged and otherwise ignored, so
/// `get` on a broken medium behaves like an empty one.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);

    /// Read and modify several entries as one step.
    ///
    /// No other `get`, `set`, `remove`, or `update` on the same store
    /// interleaves with `apply`. `apply` returns whether it changed anything;
    /// unchanged entries are not written back.
    fn update(&self, apply: &mut dyn FnMut(&mut Entries) -> bool);
}

/// Where auth state should live for this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageContext {
    /// Persist to a JSON file that survives restarts
    Persistent(PathBuf),
    /// Keep entries in memory for the lifetime of the store
    Ephemeral,
    /// No storage medium available; nothing is ever stored
    Detached,
}

impl StorageContext {
    pub fn into_store(self) -> Arc<dyn KeyValueStore> {
        match self {
            StorageContext::Persistent(path) => Arc::new(FileStore::new(path)),
            StorageContext::Ephemeral => Arc::new(MemoryStore::default()),
            StorageContext::Detached => Arc::new(NoopStore),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl MemoryStore {
    fn entries(&self) -> MutexGuard<'_, Entries> {
        // A panic while holding the lock cannot leave the map half-written.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }

    fn update(&self, apply: &mut dyn FnMut(&mut Entries) -> bool) {
        apply(&mut self.entries());
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStore;

impl KeyValueStore for NoopStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) {}

    fn remove(&self, _key: &str) {}

    fn update(&self, apply: &mut dyn FnMut(&mut Entries) -> bool) {
        apply(&mut Entries::new());
    }
}

/// Entries stored as a pretty-printed JSON object in a single file.
///
/// The file is re-read on every access so separate processes see each
/// other's writes. Writes go to a sibling temp file that is renamed over the
/// original, so a reader never observes a half-written map.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl fmt::Debug for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore").field("path", &self.path).finish()
    }
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn load(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read token storage file")?;
        if contents.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(&contents).context("Failed to parse token storage file")
    }

    fn save(&self, entries: &Entries) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)
                    .context("Failed to remove token storage file")?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let staged = self.path.with_extension("json.tmp");
        std::fs::write(&staged, serde_json::to_string_pretty(entries)?)
            .context("Failed to write token storage file")?;
        std::fs::rename(&staged, &self.path).context("Failed to replace token storage file")?;
        Ok(())
    }

    fn modify(&self, op: &str, apply: &mut dyn FnMut(&mut Entries) -> bool) {
        let _guard = self.lock();
        let mut entries = self.load().unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Discarding unreadable token storage");
            Entries::new()
        });
        if !apply(&mut entries) {
            return;
        }
        if let Err(e) = self.save(&entries) {
            warn!(path = %self.path.display(), op, error = %e, "Token storage update failed");
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock();
        match self.load() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Treating unreadable token storage as empty");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        self.modify("set", &mut |entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        });
    }

    fn remove(&self, key: &str) {
        self.modify("remove", &mut |entries| entries.remove(key).is_some());
    }

    fn update(&self, apply: &mut dyn FnMut(&mut Entries) -> bool) {
        self.modify("update", apply);
    }
}
