//! Node model: one tree entry and its identity/serialization contract.
//!
//! A node is either a `file` (a leaf pointing at a filesystem path) or a
//! `filter` (a container). Hierarchy is carried entirely by `parent`; nodes
//! never embed a child list, so structure has a single source of truth.

use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Opaque, unique node identifier. Assigned at creation, immutable, never
/// reused within a document.
///
/// Wraps a UUID but is treated as an opaque string everywhere, including in
/// the persisted JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
#[error("node id must not be empty")]
pub struct NodeIdError;

impl FromStr for NodeId {
    type Err = NodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NodeIdError);
        }
        Ok(Self(s.to_string()))
    }
}

// Serialize as a plain string so the sidecar document reads naturally.
impl Serialize for NodeId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What a node is: a leaf referencing a file, or a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Filter,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::File => f.write_str("file"),
            NodeKind::Filter => f.write_str("filter"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("label must not be empty")]
    Empty,
    #[error("label must not contain a path separator: {0:?}")]
    ContainsSeparator(String),
}

/// Validate a display label. Labels are user input; a separator would make
/// them ambiguous against target paths, so it is rejected at the boundary.
pub fn validate_label(label: &str) -> Result<(), LabelError> {
    if label.is_empty() {
        return Err(LabelError::Empty);
    }
    if label.contains('/') || label.contains('\\') {
        return Err(LabelError::ContainsSeparator(label.to_string()));
    }
    Ok(())
}

/// One entry in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    /// Owning container, `None` only for the synthetic root.
    pub parent: Option<NodeId>,
    /// Display name, user-editable.
    pub label: String,
    /// Absolute path for `file` nodes; empty for `filter` nodes.
    pub target: String,
    pub kind: NodeKind,
    /// UI collapse state, persisted so the layout survives reloads.
    pub expanded: bool,
}

impl Node {
    /// Create a `file` leaf referencing `target`.
    pub fn file(parent: NodeId, label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: NodeId::generate(),
            parent: Some(parent),
            label: label.into(),
            target: target.into(),
            kind: NodeKind::File,
            expanded: false,
        }
    }

    /// Create an empty `filter` container.
    pub fn filter(parent: NodeId, label: impl Into<String>) -> Self {
        Self {
            id: NodeId::generate(),
            parent: Some(parent),
            label: label.into(),
            target: String::new(),
            kind: NodeKind::Filter,
            expanded: false,
        }
    }

    /// The distinguished root container. Exactly one exists per document and
    /// it is never deleted.
    pub fn root() -> Self {
        Self::root_with_id(NodeId::generate())
    }

    /// Rebuild a root under a known id (document repair path).
    pub(crate) fn root_with_id(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            label: "root".to_string(),
            target: String::new(),
            kind: NodeKind::Filter,
            expanded: true,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Only containers show a collapse affordance; leaves never do.
    pub fn is_expandable(&self) -> bool {
        self.kind == NodeKind::Filter
    }

    /// Whether this node's target equals `path`. Filters have no target and
    /// never match.
    pub fn targets(&self, path: &Path) -> bool {
        self.kind == NodeKind::File && !self.target.is_empty() && Path::new(&self.target) == path
    }

    /// Produce the plain structural record that goes into the sidecar.
    pub fn serialize(&self) -> NodeRecord {
        NodeRecord {
            id: Some(self.id.clone()),
            parent_id: self.parent.clone(),
            label: Some(self.label.clone()),
            target: Some(self.target.clone()),
            kind: Some(self.kind),
            expanded: Some(self.expanded),
        }
    }

    /// Reconstruct a node from a stored record.
    ///
    /// Stored data may predate the current schema, so missing fields are
    /// reported and defaulted rather than rejected; only a record with no id
    /// at all is unusable. `fallback_parent` stands in for a missing parent
    /// reference (the document's root id).
    pub fn deserialize(record: NodeRecord, fallback_parent: &NodeId) -> Option<Self> {
        let id = match record.id {
            Some(id) => id,
            None => {
                warn!("discarding stored node without an id");
                return None;
            }
        };

        let kind = record.kind.unwrap_or_else(|| {
            warn!(node = %id, "stored node missing kind, defaulting to filter");
            NodeKind::Filter
        });
        let label = record.label.unwrap_or_else(|| {
            warn!(node = %id, "stored node missing label, defaulting to empty");
            String::new()
        });
        let target = match kind {
            NodeKind::File => record.target.unwrap_or_else(|| {
                warn!(node = %id, "stored file node missing target");
                String::new()
            }),
            // Filters carry no target; drop any stale value.
            NodeKind::Filter => String::new(),
        };
        let parent = match record.parent_id {
            Some(parent) => Some(parent),
            None => {
                warn!(node = %id, "stored node missing parent, attaching to root");
                Some(fallback_parent.clone())
            }
        };

        Some(Self {
            id,
            parent,
            label,
            target,
            kind,
            expanded: record.expanded.unwrap_or(false),
        })
    }
}

/// The serialized form of a [`Node`]: exactly the six structural fields, all
/// optional on the way in so partial records normalize instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    /// `None` is reserved for the root; stored child records always carry it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
}
