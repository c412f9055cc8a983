//! tree-core: identity-stable virtual file tree with a JSON sidecar store.
//!
//! This crate is the host-independent core of a "filters" tree view: users
//! organize file shortcuts under named containers, the layout persists to a
//! per-workspace JSON sidecar, and the host UI binds to:
//! - The tree-view contract: [`TreeController::children`] + [`view::tree_item`]
//!   plus the change notifications from [`TreeController::on_change`]
//! - Command entry points on [`Workspace`]
//! - The decoration predicate [`TreeController::locate`]

pub mod commands;
pub mod config;
pub mod controller;
pub mod document;
pub mod events;
pub mod node;
pub mod storage;
pub mod view;

pub use commands::{CommandError, HostPrompts, Workspace};
pub use config::{Config, ConfigError};
pub use controller::{TreeController, TreeError};
pub use document::{SCHEMA_VERSION, StoredDocument, TreeDocument};
pub use events::{ChangePublisher, Subscription, TreeChange};
pub use node::{LabelError, Node, NodeId, NodeKind, NodeRecord};
pub use storage::{SidecarStore, StoreError};
pub use view::{Collapsible, TreeItem, tree_item};
