//! The owned document tree.
//!
//! Nodes live in an `indextree` arena and are addressed from the outside by
//! [`NodeKey`]. Mutations of connected nodes are queued as [`DOMUpdate`]
//! values and published as a single batch by [`Document::flush`], the same
//! point at which a browser would deliver mutation records.

use crate::style::{format_px, parse_px, set_style_value, style_value};
use crate::{DOMUpdate, NodeKey};
use anyhow::{Result, anyhow};
use indextree::{Arena, NodeId};
use log::trace;
use smallvec::SmallVec;
use std::collections::HashMap;
use tokio::sync::broadcast;
use url::Url;

const UPDATE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default)]
enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
}

/// Laid-out box size in CSS pixels, as recorded by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LayoutSize {
    width: f32,
    height: f32,
}

#[derive(Debug, Clone, Default)]
struct DomNode {
    key: Option<NodeKey>,
    kind: NodeKind,
    attrs: SmallVec<[(String, String); 4]>,
    layout: Option<LayoutSize>,
}

/// Resolved `width`/`height` of an element, as strings (`"200px"`, `"auto"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedSize {
    pub width: String,
    pub height: String,
}

/// A headless document: element tree, attributes, inline style and the
/// host-provided layout sizes needed to answer computed-size reads.
#[derive(Debug)]
pub struct Document {
    arena: Arena<DomNode>,
    root: NodeId,
    ids: HashMap<NodeKey, NodeId>,
    next_key: u64,
    url: Url,
    pending: Vec<DOMUpdate>,
    update_sender: broadcast::Sender<Vec<DOMUpdate>>,
}

impl Document {
    /// Create an empty document located at `url`.
    pub fn new(url: Url) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DomNode {
            key: Some(NodeKey::ROOT),
            ..DomNode::default()
        });
        let mut ids = HashMap::new();
        ids.insert(NodeKey::ROOT, root);
        let (update_sender, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            arena,
            root,
            ids,
            next_key: 1,
            url,
            pending: Vec::new(),
            update_sender,
        }
    }

    /// The document location, also used as the base for relative URLs.
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Change the document location (same-document navigation).
    pub fn set_url(&mut self, url: Url) {
        self.url = url;
    }

    /// Subscribe to published update batches.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<DOMUpdate>> {
        self.update_sender.subscribe()
    }

    /// Create a detached element. The tag is stored lowercased.
    pub fn create_element(&mut self, tag: &str) -> NodeKey {
        let key = NodeKey(self.next_key);
        self.next_key += 1;
        let id = self.arena.new_node(DomNode {
            key: Some(key),
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
            ..DomNode::default()
        });
        self.ids.insert(key, id);
        key
    }

    /// Append `child` as the last child of `parent`, moving it if already attached.
    ///
    /// # Errors
    /// Returns an error for unknown nodes, for the document node as a child,
    /// and for insertions that would create a cycle.
    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        let len = self.children(parent).len();
        self.insert_child(parent, child, len)
    }

    /// Insert `child` under `parent` at child index `pos` (clamped).
    ///
    /// # Errors
    /// Same conditions as [`Document::append_child`].
    pub fn insert_child(&mut self, parent: NodeKey, child: NodeKey, pos: usize) -> Result<()> {
        let parent_id = self.node_id(parent)?;
        let child_id = self.node_id(child)?;
        if child_id == self.root {
            return Err(anyhow!("The document node cannot be inserted"));
        }
        if parent_id.ancestors(&self.arena).any(|id| id == child_id) {
            return Err(anyhow!("Inserting {child:?} under {parent:?} would create a cycle"));
        }
        if self.is_connected(child) {
            self.pending.push(DOMUpdate::RemoveNode { node: child });
        }
        child_id.detach(&mut self.arena);

        let siblings: Vec<NodeId> = parent_id.children(&self.arena).collect();
        let index = pos.min(siblings.len());
        let inserted = match siblings.get(index) {
            Some(next) => next.checked_insert_before(child_id, &mut self.arena),
            None => parent_id.checked_append(child_id, &mut self.arena),
        };
        inserted.map_err(|err| anyhow!("Cannot insert {child:?} under {parent:?}: {err}"))?;

        if self.is_connected(child) {
            self.queue_subtree_insert(child_id);
        }
        Ok(())
    }

    /// Remove `node` and its subtree from the document. Keys of removed nodes
    /// become unknown.
    ///
    /// # Errors
    /// Returns an error for unknown nodes and for the document node.
    pub fn remove_node(&mut self, node: NodeKey) -> Result<()> {
        let id = self.node_id(node)?;
        if id == self.root {
            return Err(anyhow!("The document node cannot be removed"));
        }
        if self.is_connected(node) {
            self.pending.push(DOMUpdate::RemoveNode { node });
        }
        let removed: Vec<NodeKey> = id
            .descendants(&self.arena)
            .filter_map(|desc| self.key_of(desc))
            .collect();
        for key in removed {
            self.ids.remove(&key);
        }
        id.remove_subtree(&mut self.arena);
        Ok(())
    }

    /// Whether `node` is a live node of this document (connected or not).
    pub fn contains(&self, node: NodeKey) -> bool {
        self.ids.contains_key(&node)
    }

    /// Whether `node` is reachable from the document node.
    pub fn is_connected(&self, node: NodeKey) -> bool {
        self.ids
            .get(&node)
            .is_some_and(|id| id.ancestors(&self.arena).any(|anc| anc == self.root))
    }

    /// Lowercase tag name of an element.
    pub fn tag(&self, node: NodeKey) -> Option<&str> {
        match &self.data(node)?.kind {
            NodeKind::Element { tag } => Some(tag.as_str()),
            NodeKind::Document => None,
        }
    }

    /// The parent element of `node`; never the document node.
    pub fn parent_element(&self, node: NodeKey) -> Option<NodeKey> {
        let id = *self.ids.get(&node)?;
        let parent = self.arena.get(id)?.parent()?;
        if parent == self.root {
            return None;
        }
        self.key_of(parent)
    }

    /// Children of `node` in order.
    pub fn children(&self, node: NodeKey) -> Vec<NodeKey> {
        self.ids.get(&node).map_or_else(Vec::new, |id| {
            id.children(&self.arena)
                .filter_map(|child| self.key_of(child))
                .collect()
        })
    }

    /// `node` followed by all of its descendants in document (pre-)order.
    pub fn descendants(&self, node: NodeKey) -> Vec<NodeKey> {
        self.ids.get(&node).map_or_else(Vec::new, |id| {
            id.descendants(&self.arena)
                .filter_map(|desc| self.key_of(desc))
                .collect()
        })
    }

    /// Connected elements whose tag is one of `tags`, in document order.
    pub fn elements_by_tag(&self, tags: &[&str]) -> Vec<NodeKey> {
        self.descendants(NodeKey::ROOT)
            .into_iter()
            .filter(|key| {
                self.tag(*key)
                    .is_some_and(|tag| tags.iter().any(|wanted| tag.eq_ignore_ascii_case(wanted)))
            })
            .collect()
    }

    /// Attribute value by ASCII case-insensitive name.
    pub fn attr(&self, node: NodeKey, name: &str) -> Option<&str> {
        self.data(node)?
            .attrs
            .iter()
            .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if `node` is not an element of this document.
    pub fn set_attr(&mut self, node: NodeKey, name: &str, value: &str) -> Result<()> {
        let connected = self.is_connected(node);
        let data = self.element_data_mut(node)?;
        let name = name.to_ascii_lowercase();
        if let Some(slot) = data.attrs.iter_mut().find(|(attr_name, _)| *attr_name == name) {
            value.clone_into(&mut slot.1);
        } else {
            data.attrs.push((name.clone(), value.to_owned()));
        }
        if connected {
            self.pending.push(DOMUpdate::SetAttr {
                node,
                name,
                value: value.to_owned(),
            });
        }
        Ok(())
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attr(&mut self, node: NodeKey, name: &str) -> bool {
        let connected = self.is_connected(node);
        let Ok(data) = self.element_data_mut(node) else {
            return false;
        };
        let before = data.attrs.len();
        data.attrs.retain(|(attr_name, _)| !attr_name.eq_ignore_ascii_case(name));
        let removed = data.attrs.len() != before;
        if removed && connected {
            self.pending.push(DOMUpdate::RemoveAttr {
                node,
                name: name.to_ascii_lowercase(),
            });
        }
        removed
    }

    /// Inline style value for `property`, if declared.
    pub fn style_property(&self, node: NodeKey, property: &str) -> Option<String> {
        style_value(self.attr(node, "style")?, property)
    }

    /// Set an inline style property. An empty value removes it.
    ///
    /// # Errors
    /// Returns an error if `node` is not an element of this document.
    pub fn set_style_property(&mut self, node: NodeKey, property: &str, value: &str) -> Result<()> {
        let current = self.attr(node, "style").unwrap_or_default();
        let updated = set_style_value(current, property, value);
        self.set_attr(node, "style", &updated)
    }

    /// Record the laid-out box size of an element.
    ///
    /// # Errors
    /// Returns an error if `node` is not an element of this document.
    pub fn set_layout_size(&mut self, node: NodeKey, width: f32, height: f32) -> Result<()> {
        self.element_data_mut(node)?.layout = Some(LayoutSize { width, height });
        Ok(())
    }

    /// Resolved width/height of a connected element.
    ///
    /// Inline pixel lengths win over the recorded layout box; without either
    /// the dimension resolves to `"auto"`. Detached nodes and the document
    /// node have no computed size.
    pub fn computed_size(&self, node: NodeKey) -> Option<ComputedSize> {
        if self.tag(node).is_none() || !self.is_connected(node) {
            return None;
        }
        let layout = self.data(node)?.layout;
        let resolve = |property: &str, laid_out: Option<f32>| {
            self.style_property(node, property)
                .and_then(|value| parse_px(&value))
                .or_else(|| laid_out.map(f64::from))
                .map_or_else(|| String::from("auto"), format_px)
        };
        Some(ComputedSize {
            width: resolve("width", layout.map(|size| size.width)),
            height: resolve("height", layout.map(|size| size.height)),
        })
    }

    /// Updates queued since the last flush.
    pub fn pending_updates(&self) -> &[DOMUpdate] {
        &self.pending
    }

    /// Publish queued updates as one batch. Returns the number of updates sent.
    pub fn flush(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        let batch = core::mem::take(&mut self.pending);
        let count = batch.len();
        if self.update_sender.send(batch).is_err() {
            trace!("Dropped a batch of {count} DOM updates with no subscribers");
        }
        count
    }

    fn queue_subtree_insert(&mut self, id: NodeId) {
        let subtree: Vec<NodeId> = id.descendants(&self.arena).collect();
        for node_id in &subtree {
            let Some(node) = self.arena.get(*node_id) else {
                continue;
            };
            let (Some(key), NodeKind::Element { tag }) = (node.get().key, &node.get().kind) else {
                continue;
            };
            let Some(parent_id) = node.parent() else {
                continue;
            };
            let pos = parent_id
                .children(&self.arena)
                .position(|sibling| sibling == *node_id)
                .unwrap_or_default();
            let Some(parent) = self.key_of(parent_id) else {
                continue;
            };
            self.pending.push(DOMUpdate::InsertElement {
                parent,
                node: key,
                tag: tag.clone(),
                pos,
            });
        }
        for node_id in subtree {
            let Some(node) = self.arena.get(node_id) else {
                continue;
            };
            let Some(key) = node.get().key else {
                continue;
            };
            for (name, value) in &node.get().attrs {
                self.pending.push(DOMUpdate::SetAttr {
                    node: key,
                    name: name.clone(),
                    value: value.clone(),
                });
            }
        }
    }

    fn node_id(&self, node: NodeKey) -> Result<NodeId> {
        self.ids
            .get(&node)
            .copied()
            .ok_or_else(|| anyhow!("Unknown node {node:?}"))
    }

    fn key_of(&self, id: NodeId) -> Option<NodeKey> {
        self.arena.get(id)?.get().key
    }

    fn data(&self, node: NodeKey) -> Option<&DomNode> {
        let id = *self.ids.get(&node)?;
        Some(self.arena.get(id)?.get())
    }

    fn element_data_mut(&mut self, node: NodeKey) -> Result<&mut DomNode> {
        let id = self.node_id(node)?;
        let data = self
            .arena
            .get_mut(id)
            .ok_or_else(|| anyhow!("Node {node:?} was removed"))?
            .get_mut();
        match data.kind {
            NodeKind::Element { .. } => Ok(data),
            NodeKind::Document => Err(anyhow!("The document node has no attributes")),
        }
    }
}
