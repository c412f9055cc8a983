//! git-decorations: mirrors Git status badges onto virtual file tree
//! entries.
//!
//! A read-only observer over the host's Git integration: paths the tree
//! owns (decided by a predicate supplied by the tree core) get a
//! badge/tooltip/color triple derived from their repository status. The
//! repository is abstracted behind [`ChangeSource`] so any harness can
//! substitute a fake.

pub mod provider;
pub mod status;

pub use provider::{Change, ChangeSource, DecorationProvider, Subscription};
pub use status::{ColorToken, Decoration, FileStatus};
