//! Workspace configuration.
//!
//! The host normally hands us the workspace root directly; `from_env` exists
//! for harnesses that run the core outside a host.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::storage::{SIDECAR_DIR, SIDECAR_FILE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SCOLUTION_WORKSPACE_PATH environment variable not set")]
    MissingWorkspacePath,
}

/// Resolved per-workspace configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace root directory.
    pub workspace_root: PathBuf,
}

impl Config {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `SCOLUTION_WORKSPACE_PATH`: workspace root (supports `~`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("SCOLUTION_WORKSPACE_PATH")
            .map_err(|_| ConfigError::MissingWorkspacePath)?;
        Ok(Self {
            workspace_root: expand_tilde(&raw),
        })
    }

    /// Where the sidecar document lives for this workspace.
    pub fn sidecar_path(&self) -> PathBuf {
        self.workspace_root.join(SIDECAR_DIR).join(SIDECAR_FILE)
    }

    /// Whether `path` is inside the workspace. File references from outside
    /// the workspace are rejected at the command boundary.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.workspace_root)
    }
}

/// Expand a `~` or `~/` prefix to the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
    } else if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path))
    } else {
        PathBuf::from(path)
    }
}
