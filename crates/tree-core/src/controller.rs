//! The tree controller: the only mutator of the document.
//!
//! Bridges the node model and the sidecar store to the host's tree-rendering
//! contract. Every mutation is synchronous from validation to persist to
//! change notification; a failed save is logged and the session keeps
//! operating on the in-memory document until the next save succeeds.

use std::path::Path;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::document::TreeDocument;
use crate::events::{ChangePublisher, Subscription, TreeChange};
use crate::node::{LabelError, Node, NodeId, NodeKind, validate_label};
use crate::storage::SidecarStore;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("unknown parent: {0}")]
    UnknownParent(NodeId),

    #[error("node {0} is a file and cannot hold children")]
    NotAContainer(NodeId),

    #[error("the root node cannot be removed or moved")]
    RootIsImmovable,

    #[error("moving {node} under {parent} would create a cycle")]
    WouldCreateCycle { node: NodeId, parent: NodeId },

    #[error(transparent)]
    Label(#[from] LabelError),
}

/// Owns the document, the store, and the change publisher.
pub struct TreeController {
    document: TreeDocument,
    store: SidecarStore,
    publisher: Rc<ChangePublisher>,
}

impl TreeController {
    /// Load (or lazily create) the document behind `store`.
    pub fn new(store: SidecarStore) -> Self {
        let document = store.load();
        Self {
            document,
            store,
            publisher: Rc::new(ChangePublisher::new()),
        }
    }

    /// Install the host's change callback. Single subscriber slot; a second
    /// call replaces the first.
    pub fn on_change(&self, callback: impl Fn(&TreeChange) + 'static) -> Subscription {
        self.publisher.subscribe(callback)
    }

    pub fn document(&self) -> &TreeDocument {
        &self.document
    }

    /// The synthetic root. Never fails.
    pub fn root(&self) -> &Node {
        self.document.root()
    }

    /// Children of `parent`, or of the root when `parent` is `None`. An
    /// unknown id answers an empty set with a diagnostic rather than an
    /// error, matching the host's `getChildren` contract.
    pub fn children(&self, parent: Option<&NodeId>) -> Vec<&Node> {
        let parent = parent.unwrap_or_else(|| self.document.root_id());
        if !self.document.contains(parent) {
            warn!(node = %parent, "children requested for unknown node");
            return Vec::new();
        }
        self.document.children(parent)
    }

    /// Insert a new file reference under `parent`.
    pub fn add_file(
        &mut self,
        parent: &NodeId,
        label: &str,
        target: &str,
    ) -> Result<NodeId, TreeError> {
        validate_label(label).inspect_err(|err| warn!(%err, "rejected file label"))?;
        self.check_container(parent)?;

        let node = Node::file(parent.clone(), label, target);
        let id = node.id().clone();
        self.document.insert(node);
        debug!(node = %id, parent = %parent, "added file reference");
        self.commit(TreeChange::Node(parent.clone()));
        Ok(id)
    }

    /// Insert a new empty filter under `parent`.
    pub fn add_filter(&mut self, parent: &NodeId, label: &str) -> Result<NodeId, TreeError> {
        validate_label(label).inspect_err(|err| warn!(%err, "rejected filter label"))?;
        self.check_container(parent)?;

        let node = Node::filter(parent.clone(), label);
        let id = node.id().clone();
        self.document.insert(node);
        debug!(node = %id, parent = %parent, "added filter");
        self.commit(TreeChange::Node(parent.clone()));
        Ok(id)
    }

    /// Delete `id` and its whole subtree. Cascading keeps parentage — the
    /// sole source of truth for structure — free of dangling references, so
    /// no orphaned node is ever persisted. Returns how many nodes went.
    pub fn remove(&mut self, id: &NodeId) -> Result<usize, TreeError> {
        if *id == *self.document.root_id() {
            warn!("refusing to remove the root node");
            return Err(TreeError::RootIsImmovable);
        }
        let parent = match self.document.get(id) {
            Some(node) => node.parent.clone(),
            None => {
                warn!(node = %id, "remove requested for unknown node");
                return Err(TreeError::UnknownNode(id.clone()));
            }
        };

        let removed = self.document.remove_subtree(id);
        debug!(node = %id, removed, "removed subtree");
        let change = match parent {
            Some(parent) => TreeChange::Node(parent),
            None => TreeChange::All,
        };
        self.commit(change);
        Ok(removed)
    }

    /// Reparent `id` under `new_parent`. Rejected when either id is unknown,
    /// the target is a file leaf, or the move would put a node beneath its
    /// own descendant.
    pub fn move_node(&mut self, id: &NodeId, new_parent: &NodeId) -> Result<(), TreeError> {
        if *id == *self.document.root_id() {
            warn!("refusing to move the root node");
            return Err(TreeError::RootIsImmovable);
        }
        if !self.document.contains(id) {
            warn!(node = %id, "move requested for unknown node");
            return Err(TreeError::UnknownNode(id.clone()));
        }
        self.check_container(new_parent)?;
        if self.document.is_ancestor(id, new_parent) {
            warn!(node = %id, parent = %new_parent, "rejected move that would create a cycle");
            return Err(TreeError::WouldCreateCycle {
                node: id.clone(),
                parent: new_parent.clone(),
            });
        }

        self.document.get_mut(id).unwrap().parent = Some(new_parent.clone());
        debug!(node = %id, parent = %new_parent, "moved node");
        // Both the old and the new subtree changed.
        self.commit(TreeChange::All);
        Ok(())
    }

    /// Change a node's display label. A label containing a path separator is
    /// rejected without mutating.
    pub fn rename(&mut self, id: &NodeId, new_label: &str) -> Result<(), TreeError> {
        validate_label(new_label).inspect_err(|err| warn!(node = %id, %err, "rejected rename"))?;
        let Some(node) = self.document.get_mut(id) else {
            warn!(node = %id, "rename requested for unknown node");
            return Err(TreeError::UnknownNode(id.clone()));
        };

        node.label = new_label.to_string();
        debug!(node = %id, label = new_label, "renamed node");
        self.commit(TreeChange::Node(id.clone()));
        Ok(())
    }

    /// Record the UI collapse state. No-op with a diagnostic on an unknown
    /// id. Persists without re-emitting: the toggle originated in the view,
    /// which already shows the new state.
    pub fn set_expanded(&mut self, id: &NodeId, expanded: bool) {
        let Some(node) = self.document.get_mut(id) else {
            warn!(node = %id, "expand state for unknown node");
            return;
        };
        if node.expanded == expanded {
            return;
        }
        node.expanded = expanded;
        self.persist();
    }

    /// Whether any file node's target equals `path`. This predicate is the
    /// only tree data exposed to the decoration layer.
    pub fn locate(&self, path: &Path) -> bool {
        self.document.iter().any(|node| node.targets(path))
    }

    /// Persist current state and re-emit "data changed": the whole tree when
    /// `node` is `None`, otherwise just that subtree.
    pub fn refresh(&mut self, node: Option<&NodeId>) {
        let change = match node {
            Some(id) if self.document.contains(id) => TreeChange::Node(id.clone()),
            Some(id) => {
                warn!(node = %id, "refresh requested for unknown node");
                TreeChange::All
            }
            None => TreeChange::All,
        };
        self.commit(change);
    }

    fn check_container(&self, parent: &NodeId) -> Result<(), TreeError> {
        match self.document.get(parent) {
            None => {
                warn!(parent = %parent, "operation against unknown parent");
                Err(TreeError::UnknownParent(parent.clone()))
            }
            Some(node) if node.kind == NodeKind::File => {
                warn!(parent = %parent, "file leaves cannot hold children");
                Err(TreeError::NotAContainer(parent.clone()))
            }
            Some(_) => Ok(()),
        }
    }

    /// Write-through persist plus change notification.
    fn commit(&mut self, change: TreeChange) {
        self.persist();
        self.publisher.emit(&change);
    }

    /// Save, reporting failure to the log only. Storage trouble must not end
    /// the session; the in-memory document keeps accumulating mutations
    /// until a later save succeeds.
    fn persist(&self) {
        if let Err(err) = self.store.save(&self.document) {
            warn!(%err, "failed to persist tree, continuing in memory");
        }
    }
}
