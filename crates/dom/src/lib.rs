//! Headless document tree and DOM mirroring primitives.
//!
//! The [`Document`] owns an arena tree of elements and publishes every
//! structural or attribute change as a batch of [`DOMUpdate`] values. Other
//! subsystems observe the tree by wrapping a [`DOMSubscriber`] in a
//! [`DOMMirror`] and draining batches as they are flushed.

use anyhow::{Result, anyhow};
use log::warn;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

pub mod document;
pub mod style;

pub use document::{ComputedSize, Document};
pub use style::{Declaration, format_px, parse_px, parse_style_attribute};

/// A stable 64-bit key for document nodes. Equality is identity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

impl NodeKey {
    /// The document node key (always present).
    pub const ROOT: Self = Self(0);
}

/// A batchable change to the document, mirrored to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DOMUpdate {
    /// An element became connected under `parent` at child index `pos`.
    InsertElement {
        parent: NodeKey,
        node: NodeKey,
        tag: String,
        pos: usize,
    },
    /// An attribute was set on a connected element.
    SetAttr {
        node: NodeKey,
        name: String,
        value: String,
    },
    /// An attribute was removed from a connected element.
    RemoveAttr { node: NodeKey, name: String },
    /// A connected subtree rooted at `node` was removed.
    RemoveNode { node: NodeKey },
}

impl DOMUpdate {
    /// Whether this update changes the child list of some node.
    pub const fn is_child_list(&self) -> bool {
        matches!(self, Self::InsertElement { .. } | Self::RemoveNode { .. })
    }
}

/// A subscriber that receives `DOMUpdate` values and mirrors them into its own state.
pub trait DOMSubscriber {
    /// Apply a single `DOMUpdate` to the subscriber state.
    ///
    /// # Errors
    /// Returns an error when the subscriber cannot reconcile the update.
    fn apply_update(&mut self, update: DOMUpdate) -> Result<()>;
}

/// Generic mirror that applies incoming DOM update batches to a subscriber.
pub struct DOMMirror<T: DOMSubscriber> {
    in_updater: broadcast::Receiver<Vec<DOMUpdate>>,
    mirror: T,
}

impl<T: DOMSubscriber> DOMMirror<T> {
    /// Create a new `DOMMirror` wrapping a subscriber implementation.
    pub const fn new(in_updater: broadcast::Receiver<Vec<DOMUpdate>>, mirror: T) -> Self {
        Self { in_updater, mirror }
    }

    /// Drain and apply all pending batches without blocking.
    ///
    /// Returns the number of batches applied. Lagged receivers skip the
    /// overwritten batches and keep draining.
    ///
    /// # Errors
    /// Returns an error if the document side of the channel was dropped, or if
    /// the subscriber rejects an update.
    pub fn try_update_sync(&mut self) -> Result<usize> {
        let mut applied = 0;
        loop {
            match self.in_updater.try_recv() {
                Ok(batch) => {
                    for update in batch {
                        self.mirror.apply_update(update)?;
                    }
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("DOM mirror lagged behind by {skipped} batches");
                }
                Err(TryRecvError::Closed) => {
                    return Err(anyhow!("Document update channel was closed"));
                }
            }
        }
        Ok(applied)
    }

    /// Access the inner mirror mutably.
    pub fn mirror_mut(&mut self) -> &mut T {
        &mut self.mirror
    }

    /// Access the inner mirror immutably.
    pub fn mirror(&self) -> &T {
        &self.mirror
    }
}
