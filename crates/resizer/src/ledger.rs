//! Baseline dimensions of scaled elements.
//!
//! The ledger is a side table keyed by node identity. An entry exists exactly
//! while its element is scaled: it is captured on the first scale after a
//! reset and removed by the reset. Scaling always starts from the entry, so
//! repeated applications never compound.

use crate::scaling::write_size;
use dom::{Document, NodeKey};
use log::{debug, trace};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Computed size of an element before the engine first scaled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineEntry {
    pub original_width: String,
    pub original_height: String,
}

/// Identity-keyed table of baseline entries.
#[derive(Debug, Default)]
pub struct DimensionLedger {
    entries: HashMap<NodeKey, BaselineEntry>,
}

impl DimensionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entry for `node`, snapshotting its computed size first if
    /// there is none. `None` when the node has no computed size (detached).
    pub fn capture_if_absent(&mut self, doc: &Document, node: NodeKey) -> Option<&BaselineEntry> {
        match self.entries.entry(node) {
            Entry::Occupied(existing) => Some(&*existing.into_mut()),
            Entry::Vacant(slot) => {
                let size = doc.computed_size(node)?;
                trace!("Captured baseline {}x{} for {node:?}", size.width, size.height);
                Some(&*slot.insert(BaselineEntry {
                    original_width: size.width,
                    original_height: size.height,
                }))
            }
        }
    }

    pub fn get(&self, node: NodeKey) -> Option<&BaselineEntry> {
        self.entries.get(&node)
    }

    pub fn contains(&self, node: NodeKey) -> bool {
        self.entries.contains_key(&node)
    }

    /// Remove and return the entry for `node`, if any.
    pub fn clear(&mut self, node: NodeKey) -> Option<BaselineEntry> {
        self.entries.remove(&node)
    }

    /// Write the baseline of `node` back to its inline size and clear it.
    /// An empty baseline height restores as `auto`. Returns `false` when
    /// there was no entry or the write failed; a failed write keeps the entry.
    pub fn restore(&mut self, doc: &mut Document, node: NodeKey) -> bool {
        let Some(entry) = self.entries.get(&node) else {
            return false;
        };
        let height = if entry.original_height.is_empty() {
            "auto"
        } else {
            entry.original_height.as_str()
        };
        if !write_size(doc, node, &entry.original_width, height) {
            debug!("Keeping baseline of {node:?} after a failed restore");
            return false;
        }
        self.entries.remove(&node);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries of nodes that no longer exist in `doc`. Returns how many were dropped.
    pub fn prune(&mut self, doc: &Document) -> usize {
        let before = self.entries.len();
        self.entries.retain(|node, _| doc.contains(*node));
        before - self.entries.len()
    }
}
