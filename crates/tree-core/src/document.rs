//! The tree document: a root pointer plus a flat id-keyed node map.
//!
//! Hierarchy is derived purely from each node's `parent` reference. There is
//! no second child-list structure to drift out of sync; `children` scans the
//! map. Documents loaded from disk are repaired here so that every document
//! handed to the controller satisfies the structural invariants.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::node::{Node, NodeId, NodeKind, NodeRecord};

/// Current sidecar schema version.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// The in-memory document: one root, all nodes in a single id-keyed map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeDocument {
    root: NodeId,
    nodes: BTreeMap<NodeId, Node>,
}

impl TreeDocument {
    /// A fresh document containing only the synthetic root.
    pub fn new() -> Self {
        let root = Node::root();
        let root_id = root.id().clone();
        let mut nodes = BTreeMap::new();
        nodes.insert(root_id.clone(), root);
        Self {
            root: root_id,
            nodes,
        }
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root
    }

    /// The root node. Always present.
    pub fn root(&self) -> &Node {
        &self.nodes[&self.root]
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// No user nodes; only the synthetic root remains.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Nodes whose `parent` is `id`, in map (id) order. No user-facing
    /// ordering is promised, but the order is stable across reloads.
    pub fn children(&self, id: &NodeId) -> Vec<&Node> {
        self.nodes
            .values()
            .filter(|n| n.parent.as_ref() == Some(id))
            .collect()
    }

    /// Insert a node. The caller has already validated the parent reference.
    pub(crate) fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id().clone(), node);
    }

    /// Remove `id` and its entire subtree, returning how many nodes were
    /// removed. The root is never removed.
    pub(crate) fn remove_subtree(&mut self, id: &NodeId) -> usize {
        if *id == self.root {
            return 0;
        }
        let mut doomed = vec![id.clone()];
        let mut i = 0;
        while i < doomed.len() {
            let parent = doomed[i].clone();
            doomed.extend(self.children(&parent).iter().map(|n| n.id().clone()));
            i += 1;
        }
        let mut removed = 0;
        for id in doomed {
            if self.nodes.remove(&id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Whether `ancestor` appears on `id`'s parent chain (inclusive of `id`
    /// itself). Used to reject reparenting that would create a cycle.
    pub fn is_ancestor(&self, ancestor: &NodeId, id: &NodeId) -> bool {
        let mut current = Some(id.clone());
        let mut hops = 0;
        while let Some(cur) = current {
            if cur == *ancestor {
                return true;
            }
            if hops > self.nodes.len() {
                return false;
            }
            current = self.nodes.get(&cur).and_then(|n| n.parent.clone());
            hops += 1;
        }
        false
    }

    /// Whether `id`'s parent chain terminates at the root in a finite number
    /// of hops. True for every node of a valid document.
    pub fn chain_terminates_at_root(&self, id: &NodeId) -> bool {
        let mut current = Some(id.clone());
        let mut hops = 0;
        while let Some(cur) = current {
            if cur == self.root {
                return true;
            }
            if hops > self.nodes.len() {
                return false;
            }
            current = match self.nodes.get(&cur) {
                Some(node) => node.parent.clone(),
                None => return false,
            };
            hops += 1;
        }
        false
    }

    /// Produce the stored form: version, root pointer, id → record map.
    pub fn serialize(&self) -> StoredDocument {
        StoredDocument {
            version: Some(SCHEMA_VERSION.to_string()),
            root: Some(self.root.clone()),
            tree: self
                .nodes
                .iter()
                .map(|(id, node)| (id.clone(), node.serialize()))
                .collect(),
        }
    }

    /// Rebuild a document from its stored form, repairing anything that no
    /// longer satisfies the invariants. Never fails: the worst malformed
    /// input degrades to a fresh document.
    pub fn deserialize(stored: StoredDocument) -> Self {
        // Migration policy: same major version loads (record normalization
        // absorbs minor drift); anything else starts fresh rather than
        // silently reusing incompatible data.
        let version = stored.version.unwrap_or_default();
        if major_version(&version) != major_version(SCHEMA_VERSION) {
            warn!(
                found = %version,
                expected = %SCHEMA_VERSION,
                "sidecar schema version mismatch, starting fresh"
            );
            return Self::new();
        }

        // Resolve the root first so repairs below have somewhere to attach.
        let mut records: Vec<NodeRecord> = Vec::with_capacity(stored.tree.len());
        for (key, mut record) in stored.tree {
            match &record.id {
                Some(id) if *id != key => {
                    warn!(key = %key, id = %id, "stored node id disagrees with map key, using key");
                    record.id = Some(key);
                }
                None => record.id = Some(key),
                _ => {}
            }
            records.push(record);
        }

        let root_id = stored
            .root
            .filter(|root| records.iter().any(|r| r.id.as_ref() == Some(root)))
            .unwrap_or_else(|| {
                // Fall back to any stored parentless node before minting a
                // new root.
                records
                    .iter()
                    .find(|r| r.parent_id.is_none())
                    .and_then(|r| r.id.clone())
                    .unwrap_or_else(|| {
                        warn!("stored document has no usable root, creating one");
                        NodeId::generate()
                    })
            });

        let mut nodes = BTreeMap::new();
        for record in records {
            if record.id.as_ref() == Some(&root_id) {
                // The root is rebuilt rather than normalized: its parent is
                // legitimately absent and its kind is always a container.
                let mut root = Node::root_with_id(root_id.clone());
                if let Some(label) = record.label {
                    root.label = label;
                }
                if let Some(expanded) = record.expanded {
                    root.expanded = expanded;
                }
                nodes.insert(root_id.clone(), root);
            } else if let Some(node) = Node::deserialize(record, &root_id) {
                nodes.insert(node.id().clone(), node);
            }
        }
        if !nodes.contains_key(&root_id) {
            // Keep the resolved id so child parent references stay valid.
            nodes.insert(root_id.clone(), Node::root_with_id(root_id.clone()));
        }

        let mut doc = Self {
            root: root_id,
            nodes,
        };
        doc.repair();
        doc
    }

    /// Re-attach anything structurally unsound to the root: extra parentless
    /// nodes, dangling parent references, children claimed by file leaves,
    /// and nodes caught in a parent cycle.
    fn repair(&mut self) {
        let root = self.root.clone();
        let ids: Vec<NodeId> = self.nodes.keys().cloned().collect();

        for id in &ids {
            if *id == root {
                continue;
            }
            let parent = self.nodes[id].parent.clone();
            let reattach = match parent {
                None => {
                    warn!(node = %id, "second parentless node, attaching to root");
                    true
                }
                Some(ref p) if !self.nodes.contains_key(p) => {
                    warn!(node = %id, parent = %p, "dangling parent reference, attaching to root");
                    true
                }
                Some(ref p) if self.nodes[p].kind == NodeKind::File => {
                    warn!(node = %id, parent = %p, "parent is a file leaf, attaching to root");
                    true
                }
                Some(_) => false,
            };
            if reattach {
                self.nodes.get_mut(id).unwrap().parent = Some(root.clone());
            }
        }

        // Break parent cycles. Any node whose chain cannot reach the root by
        // now is part of a cycle among otherwise-valid references.
        let mut orphaned: HashSet<NodeId> = HashSet::new();
        for id in &ids {
            if self.nodes.contains_key(id) && !self.chain_terminates_at_root(id) {
                orphaned.insert(id.clone());
            }
        }
        for id in orphaned {
            warn!(node = %id, "parent cycle detected, attaching to root");
            if let Some(node) = self.nodes.get_mut(&id) {
                node.parent = Some(root.clone());
            }
        }

        debug!(nodes = self.nodes.len(), "document ready");
    }
}

impl Default for TreeDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// On-disk shape of the sidecar: `{ version, root, tree: { id: record } }`.
/// Everything is optional on the way in; [`TreeDocument::deserialize`]
/// normalizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<NodeId>,
    #[serde(default)]
    pub tree: BTreeMap<NodeId, NodeRecord>,
}

fn major_version(version: &str) -> Option<u32> {
    version.split('.').next()?.parse().ok()
}
