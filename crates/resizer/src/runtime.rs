//! Single-threaded page loop.
//!
//! Everything that can touch the document arrives as a [`PageEvent`] on one
//! queue: child-list mutations observed through a [`DOMMirror`], commands
//! and navigations sent through a [`PageHandle`], and storage change
//! notifications. [`PageRuntime::run_until_idle`] drains the queue and runs
//! one handler per event kind; no handler ever fails.

use crate::command::{Command, dispatch};
use crate::config::ResizerConfig;
use crate::ledger::DimensionLedger;
use crate::watcher::MutationWatcher;
use anyhow::{Result, anyhow};
use dom::{DOMMirror, DOMSubscriber, DOMUpdate, Document, NodeKey};
use log::{debug, error, trace, warn};
use origin_settings::{CURRENT_HOSTNAME_KEY, KeyValueStore, SettingsStore, StorageChange};
use serde_json::Value;
use std::collections::HashSet;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, mpsc};
use url::Url;

/// One unit of work for the page loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Roots of subtrees that became connected, in insertion order.
    Inserted(Vec<NodeKey>),
    /// A decoded command from the settings panel.
    CommandReceived(Command),
    /// The page location changed without a reload.
    NavigationChanged(String),
    /// A store key was written or removed.
    StorageChanged(String),
}

/// Cloneable sender of events into a page loop.
#[derive(Debug, Clone)]
pub struct PageHandle {
    sender: mpsc::UnboundedSender<PageEvent>,
}

impl PageHandle {
    /// Queue an event.
    ///
    /// # Errors
    /// Returns an error if the page runtime was dropped.
    pub fn send(&self, event: PageEvent) -> Result<()> {
        self.sender
            .send(event)
            .map_err(|err| anyhow!("Page runtime is gone: {err}"))
    }

    /// Decode and queue a `{action, data}` message. Returns `false` when the
    /// message was not a known command and nothing was queued.
    ///
    /// # Errors
    /// Returns an error if the page runtime was dropped.
    pub fn send_message(&self, message: &Value) -> Result<bool> {
        let Some(command) = Command::from_message(message) else {
            return Ok(false);
        };
        self.send(PageEvent::CommandReceived(command))?;
        Ok(true)
    }

    /// Queue a same-document navigation.
    ///
    /// # Errors
    /// Returns an error if the page runtime was dropped.
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.send(PageEvent::NavigationChanged(url.to_owned()))
    }
}

/// Collects child-list mutations from published DOM batches.
#[derive(Debug, Default)]
struct InsertionCollector {
    inserted: Vec<NodeKey>,
    seen: HashSet<NodeKey>,
    removed: bool,
}

impl InsertionCollector {
    fn take(&mut self) -> (Vec<NodeKey>, bool) {
        self.seen.clear();
        (
            core::mem::take(&mut self.inserted),
            core::mem::take(&mut self.removed),
        )
    }
}

impl DOMSubscriber for InsertionCollector {
    fn apply_update(&mut self, update: DOMUpdate) -> Result<()> {
        match update {
            DOMUpdate::InsertElement { parent, node, .. } => {
                // Descendants of an inserted root are covered by the root.
                if !self.seen.contains(&parent) {
                    self.inserted.push(node);
                }
                self.seen.insert(node);
            }
            DOMUpdate::RemoveNode { .. } => self.removed = true,
            DOMUpdate::SetAttr { .. } | DOMUpdate::RemoveAttr { .. } => {}
        }
        Ok(())
    }
}

/// The resize engine attached to one document.
pub struct PageRuntime<S: KeyValueStore> {
    document: Document,
    ledger: DimensionLedger,
    watcher: MutationWatcher,
    settings: SettingsStore<S>,
    mutations: DOMMirror<InsertionCollector>,
    storage_changes: broadcast::Receiver<StorageChange>,
    events: mpsc::UnboundedReceiver<PageEvent>,
    sender: mpsc::UnboundedSender<PageEvent>,
}

impl<S: KeyValueStore> PageRuntime<S> {
    /// Attach the engine to `document` and record its hostname as the
    /// current one in `store`. Content already in the tree counts as loaded,
    /// not inserted.
    pub async fn new(mut document: Document, store: S, config: &ResizerConfig) -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        document.flush();
        let mutations = DOMMirror::new(document.subscribe(), InsertionCollector::default());
        let storage_changes = store.subscribe();
        let mut runtime = Self {
            ledger: DimensionLedger::new(),
            watcher: MutationWatcher::new(config),
            settings: SettingsStore::new(store),
            mutations,
            storage_changes,
            events,
            sender,
            document,
        };
        let url = runtime.document.url().to_string();
        runtime.track_navigation(&url).await;
        runtime
    }

    /// A sender for commands and navigations.
    pub fn handle(&self) -> PageHandle {
        PageHandle {
            sender: self.sender.clone(),
        }
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for the host: tree edits and layout sizes. Edits are
    /// observed on the next [`PageRuntime::run_until_idle`].
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub const fn ledger(&self) -> &DimensionLedger {
        &self.ledger
    }

    pub const fn watcher(&self) -> &MutationWatcher {
        &self.watcher
    }

    pub const fn settings(&self) -> &SettingsStore<S> {
        &self.settings
    }

    /// Handle queued events, including mutations and storage changes that
    /// occur while handling, until nothing is left. Returns the number of
    /// events handled.
    pub async fn run_until_idle(&mut self) -> usize {
        let mut handled = 0;
        loop {
            self.collect_storage_changes();
            self.collect_mutations();
            let Ok(event) = self.events.try_recv() else {
                break;
            };
            self.handle_event(event).await;
            handled += 1;
        }
        handled
    }

    /// Run the handler for one event.
    pub async fn handle_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Inserted(roots) => {
                let report = self
                    .watcher
                    .on_inserted(&mut self.document, &mut self.ledger, &self.settings, &roots)
                    .await;
                trace!("Insertion of {} roots handled: {report:?}", roots.len());
            }
            PageEvent::CommandReceived(command) => {
                let report = dispatch(&mut self.document, &mut self.ledger, command);
                debug!("{command:?} handled: {report:?}");
            }
            PageEvent::NavigationChanged(url) => {
                match Url::parse(&url) {
                    Ok(parsed) => self.document.set_url(parsed),
                    Err(err) => debug!("Keeping document URL; {url:?} does not parse: {err}"),
                }
                self.track_navigation(&url).await;
            }
            PageEvent::StorageChanged(key) => self.watcher.storage_changed(&key),
        }
    }

    async fn track_navigation(&mut self, url: &str) {
        let Some(hostname) = self.watcher.navigation_changed(url) else {
            return;
        };
        if let Err(err) = self.settings.set_current_hostname(&hostname).await {
            error!("Could not record current hostname {hostname:?}: {err:#}");
        }
    }

    fn collect_mutations(&mut self) {
        self.document.flush();
        if let Err(err) = self.mutations.try_update_sync() {
            warn!("Mutation feed failed: {err:#}");
        }
        let (inserted, removed) = self.mutations.mirror_mut().take();
        if removed {
            let pruned = self.ledger.prune(&self.document);
            if pruned > 0 {
                debug!("Pruned {pruned} baselines of removed nodes");
            }
        }
        if !inserted.is_empty() {
            self.enqueue(PageEvent::Inserted(inserted));
        }
    }

    fn collect_storage_changes(&mut self) {
        loop {
            match self.storage_changes.try_recv() {
                Ok(change) => self.enqueue(PageEvent::StorageChanged(change.key)),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Missed {skipped} storage changes; dropping cached settings");
                    self.enqueue(PageEvent::StorageChanged(CURRENT_HOSTNAME_KEY.to_owned()));
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    fn enqueue(&self, event: PageEvent) {
        if self.sender.send(event).is_err() {
            trace!("Event queue closed");
        }
    }
}
