//! Reapplication of saved settings when content is inserted after load.
//!
//! The watcher owns the page's active origin. Each insertion batch that
//! contains `img`/`svg` elements costs at most one settings read and
//! reapplies the origin's settings to the whole document, so content that was
//! already loaded catches up too. With caching enabled the read is reused
//! until navigation or a relevant storage change invalidates it. Pages
//! without an origin never read settings.

use crate::config::ResizerConfig;
use crate::ledger::DimensionLedger;
use crate::scaling::{ApplyReport, ScaleParams, Scope, apply_scale, visual_elements};
use dom::{Document, NodeKey};
use log::{debug, error, info, trace};
use origin_settings::{CURRENT_HOSTNAME_KEY, KeyValueStore, OriginSettings, SettingsStore};
use url::Url;

/// Whether the watcher is currently processing an insertion batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Reacting,
}

/// Reacts to insertion batches on behalf of one page.
#[derive(Debug)]
pub struct MutationWatcher {
    active_origin: Option<String>,
    last_url: Option<String>,
    cache_enabled: bool,
    cached: Option<Option<OriginSettings>>,
    state: WatcherState,
}

impl MutationWatcher {
    pub fn new(config: &ResizerConfig) -> Self {
        Self {
            active_origin: None,
            last_url: None,
            cache_enabled: config.cache_settings,
            cached: None,
            state: WatcherState::Idle,
        }
    }

    pub fn active_origin(&self) -> Option<&str> {
        self.active_origin.as_deref()
    }

    pub const fn state(&self) -> WatcherState {
        self.state
    }

    /// Settings currently held in the cache, if any were read.
    pub fn cached_settings(&self) -> Option<Option<OriginSettings>> {
        self.cached
    }

    /// Track a navigation. Returns the hostname to persist as the current one
    /// when the URL changed; unparseable URLs keep the previous origin.
    pub fn navigation_changed(&mut self, url: &str) -> Option<String> {
        if self.last_url.as_deref() == Some(url) {
            trace!("Navigation to the same URL {url}");
            return None;
        }
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(err) => {
                error!("Invalid URL {url:?}: {err}");
                return None;
            }
        };
        self.last_url = Some(url.to_owned());
        let hostname = parsed.host_str().unwrap_or_default().to_owned();
        info!("Active origin is now {hostname:?}");
        self.active_origin = (!hostname.is_empty()).then(|| hostname.clone());
        self.cached = None;
        Some(hostname)
    }

    /// Invalidate cached settings when the hostname pointer or the active
    /// origin's record changed.
    pub fn storage_changed(&mut self, key: &str) {
        let relevant = key == CURRENT_HOSTNAME_KEY || self.active_origin.as_deref() == Some(key);
        if relevant && self.cached.take().is_some() {
            debug!("Dropped cached settings after change of {key:?}");
        }
    }

    /// React to newly inserted subtrees: if any contains visual elements and
    /// the active origin has a non-zero scale saved, scale every visual
    /// element of the document.
    pub async fn on_inserted<S: KeyValueStore>(
        &mut self,
        doc: &mut Document,
        ledger: &mut DimensionLedger,
        store: &SettingsStore<S>,
        inserted: &[NodeKey],
    ) -> ApplyReport {
        let connected: Vec<NodeKey> = inserted
            .iter()
            .copied()
            .filter(|root| doc.is_connected(*root))
            .collect();
        if visual_elements(doc, Scope::Subtrees(&connected)).is_empty() {
            return ApplyReport::default();
        }

        self.state = WatcherState::Reacting;
        let report = match self.lookup(store).await {
            Some(settings) if settings.has_scale() => {
                apply_scale(doc, ledger, ScaleParams::from(settings), Scope::Document)
            }
            Some(_) => {
                debug!("Saved scale is zero; leaving inserted content alone");
                ApplyReport::default()
            }
            None => {
                debug!("No saved settings for {:?}", self.active_origin);
                ApplyReport::default()
            }
        };
        self.state = WatcherState::Idle;
        report
    }

    async fn lookup<S: KeyValueStore>(&mut self, store: &SettingsStore<S>) -> Option<OriginSettings> {
        let Some(origin) = &self.active_origin else {
            return None;
        };
        if self.cache_enabled {
            if let Some(cached) = self.cached {
                return cached;
            }
        }
        let settings = store.settings_for(origin).await;
        if self.cache_enabled {
            self.cached = Some(settings);
        }
        settings
    }
}
