//! The persisted key/value store contract and an in-memory implementation.

use anyhow::{Result, anyhow};
use log::trace;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Notification published after a key was written or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// The key that changed.
    pub key: String,
    /// The new value, or `None` when the key was removed.
    pub new_value: Option<Value>,
}

/// Asynchronous JSON key/value store shared by the settings panel and pages.
#[allow(
    async_fn_in_trait,
    reason = "Stores are awaited on a single-threaded page loop; no Send bound is needed"
)]
pub trait KeyValueStore {
    /// Read a key. `Ok(None)` when absent.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a key, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be written.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove a key; removing an absent key succeeds.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be written.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Subscribe to change notifications for every key.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

/// In-memory store. Clones share the same map and change channel.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, Value>>>,
    changes: broadcast::Sender<StorageChange>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            entries: Arc::new(Mutex::new(BTreeMap::new())),
            changes,
        }
    }

    /// Keys currently stored, in order.
    ///
    /// # Errors
    /// Returns an error if the map mutex was poisoned.
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, Value>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("MemoryStore mutex poisoned"))
    }

    fn publish(&self, key: &str, new_value: Option<Value>) {
        let change = StorageChange {
            key: key.to_owned(),
            new_value,
        };
        if self.changes.send(change).is_err() {
            trace!("No storage listeners for change of {key:?}");
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.lock()?.insert(key.to_owned(), value.clone());
        self.publish(key, Some(value));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let removed = self.lock()?.remove(key);
        if removed.is_some() {
            self.publish(key, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
