//! The host tree-view contract.
//!
//! The host shell renders the tree through two calls: `children` (on
//! [`TreeController`](crate::TreeController)) and [`tree_item`], which turns
//! a node into the plain descriptor the host maps 1:1 onto its own widget
//! type. Nothing here mutates; it is a projection of the node model.

use serde::Serialize;

use crate::node::{Node, NodeKind};

/// Collapse affordance for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collapsible {
    /// Leaf: no expand arrow.
    None,
    Collapsed,
    Expanded,
}

/// Command descriptor attached to leaves so clicking opens the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenCommand {
    /// Host command identifier.
    pub command: &'static str,
    pub title: &'static str,
    /// The file to open.
    pub argument: String,
}

/// Plain rendering data for one tree entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeItem {
    pub id: String,
    pub label: String,
    pub collapsible: Collapsible,
    /// The target path; shown on hover.
    pub tooltip: String,
    /// Context tag for host menu contributions ("file" or "filter").
    pub context: &'static str,
    /// Resource the host routes decorations through; leaves only.
    pub resource: Option<String>,
    pub command: Option<OpenCommand>,
}

/// Project a node into its rendering descriptor.
pub fn tree_item(node: &Node) -> TreeItem {
    let collapsible = if node.is_expandable() {
        if node.expanded {
            Collapsible::Expanded
        } else {
            Collapsible::Collapsed
        }
    } else {
        Collapsible::None
    };

    let (context, resource, command) = match node.kind {
        NodeKind::File => (
            "file",
            Some(node.target.clone()),
            Some(OpenCommand {
                command: "vscode.open",
                title: "Open File",
                argument: node.target.clone(),
            }),
        ),
        NodeKind::Filter => ("filter", None, None),
    };

    TreeItem {
        id: node.id().to_string(),
        label: node.label.clone(),
        collapsible,
        tooltip: node.target.clone(),
        context,
        resource,
        command,
    }
}
