//! Typed reads and writes of origin settings on top of a [`KeyValueStore`].
//!
//! Read failures and malformed records never surface: they are logged and
//! reported as "no settings", which callers treat as nothing to reapply.

use crate::{KeyValueStore, OriginSettings};
use anyhow::Result;
use log::{debug, warn};
use serde_json::Value;

/// Key holding the hostname of the page most recently loaded or navigated.
pub const CURRENT_HOSTNAME_KEY: &str = "currentHostname";

/// Origin settings view over a key/value store.
#[derive(Debug, Clone)]
pub struct SettingsStore<S> {
    store: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    /// Wrap a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The wrapped store.
    pub const fn inner(&self) -> &S {
        &self.store
    }

    /// Hostname recorded under [`CURRENT_HOSTNAME_KEY`]; empty strings count as absent.
    pub async fn current_hostname(&self) -> Option<String> {
        match self.read(CURRENT_HOSTNAME_KEY).await? {
            Value::String(hostname) if !hostname.is_empty() => Some(hostname),
            Value::String(_) => None,
            other => {
                warn!("Ignoring non-string {CURRENT_HOSTNAME_KEY}: {other}");
                None
            }
        }
    }

    /// Record the active hostname.
    ///
    /// # Errors
    /// Returns an error if the store rejects the write.
    pub async fn set_current_hostname(&self, hostname: &str) -> Result<()> {
        self.store
            .set(CURRENT_HOSTNAME_KEY, Value::String(hostname.to_owned()))
            .await
    }

    /// Settings saved for `origin`, if any.
    pub async fn settings_for(&self, origin: &str) -> Option<OriginSettings> {
        let value = self.read(origin).await?;
        match serde_json::from_value::<OriginSettings>(value) {
            Ok(settings) => Some(settings),
            Err(err) => {
                warn!("Ignoring malformed settings for {origin}: {err}");
                None
            }
        }
    }

    /// Save settings for `origin`.
    ///
    /// # Errors
    /// Returns an error if the settings cannot be encoded or the store rejects the write.
    pub async fn save(&self, origin: &str, settings: &OriginSettings) -> Result<()> {
        let value = serde_json::to_value(settings)?;
        self.store.set(origin, value).await
    }

    /// The active hostname together with its settings, read in one sequence.
    pub async fn active_settings(&self) -> Option<(String, OriginSettings)> {
        let hostname = self.current_hostname().await?;
        let settings = self.settings_for(&hostname).await?;
        Some((hostname, settings))
    }

    async fn read(&self, key: &str) -> Option<Value> {
        match self.store.get(key).await {
            Ok(value) => {
                if value.is_none() {
                    debug!("No stored value for {key:?}");
                }
                value
            }
            Err(err) => {
                warn!("Store read of {key:?} failed, treating as absent: {err:#}");
                None
            }
        }
    }
}
