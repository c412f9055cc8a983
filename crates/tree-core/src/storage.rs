//! Persistence for the tree document.
//!
//! The document lives in a JSON sidecar at `.vscode/scolution.json` inside
//! the workspace. The store is write-through: the controller saves after
//! every mutation. Load never fails — an absent, unreadable, or unparsable
//! sidecar yields a fresh document, and save errors are reported to the
//! caller rather than thrown, so a storage hiccup never ends the session.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::document::{StoredDocument, TreeDocument};

/// Sidecar directory inside the workspace.
pub(crate) const SIDECAR_DIR: &str = ".vscode";
/// Sidecar file name.
pub(crate) const SIDECAR_FILE: &str = "scolution.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reads and writes the sidecar document.
pub struct SidecarStore {
    path: PathBuf,
}

impl SidecarStore {
    /// Store for the given workspace root. Nothing is touched on disk until
    /// the first save.
    pub fn new(workspace_root: &Path) -> Self {
        Self {
            path: workspace_root.join(SIDECAR_DIR).join(SIDECAR_FILE),
        }
    }

    /// Store over an explicit sidecar path (used by tests and by hosts with
    /// a non-default storage location).
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. Recoverable by design: any failure (missing file,
    /// I/O error, bad JSON) is logged and answered with a fresh document.
    pub fn load(&self) -> TreeDocument {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no sidecar yet, starting fresh");
            return TreeDocument::new();
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "failed to read sidecar, starting fresh");
                return TreeDocument::new();
            }
        };

        let stored: StoredDocument = match serde_json::from_str(&contents) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "sidecar is not valid JSON, starting fresh");
                return TreeDocument::new();
            }
        };

        TreeDocument::deserialize(stored)
    }

    /// Serialize and overwrite the sidecar. Failures are the caller's to
    /// report; the in-memory document stays authoritative either way.
    pub fn save(&self, document: &TreeDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let contents = serde_json::to_string_pretty(&document.serialize())?;
        fs::write(&self.path, contents).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), nodes = document.len(), "sidecar saved");
        Ok(())
    }
}
