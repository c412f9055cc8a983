//! The decoration provider: a read-only mirror of repository state.
//!
//! Given a path the tree owns (decided by a predicate the tree supplies),
//! the provider resolves the file's Git status and answers its decoration.
//! The repository sits behind [`ChangeSource`] — the only capability this
//! crate needs — so tests substitute a scripted fake. On a repository state
//! change the provider re-emits invalidations for tree-member paths through
//! a single subscriber slot, mirroring the tree's own notification shape.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::status::{Decoration, FileStatus};

/// One changed file with its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub path: PathBuf,
    pub status: FileStatus,
}

/// The narrow repository capability: changed paths with a status. The host's
/// Git integration implements this; tests use a fake.
pub trait ChangeSource {
    /// Unstaged changes in the working tree.
    fn working_tree_changes(&self) -> Vec<Change>;

    /// Staged changes in the index.
    fn index_changes(&self) -> Vec<Change>;
}

/// Subscription handle for decoration invalidations; clears the slot on
/// drop.
pub struct Subscription {
    provider: Weak<InvalidationSlot>,
    generation: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(slot) = self.provider.upgrade() {
            slot.unsubscribe(self.generation);
        }
    }
}

/// Single subscriber slot for "this path's decoration changed" events.
struct InvalidationSlot {
    slot: RefCell<Option<(u64, Rc<dyn Fn(&Path)>)>>,
    next_generation: Cell<u64>,
}

impl InvalidationSlot {
    fn new() -> Self {
        Self {
            slot: RefCell::new(None),
            next_generation: Cell::new(0),
        }
    }

    fn subscribe(self: &Rc<Self>, callback: impl Fn(&Path) + 'static) -> Subscription {
        let generation = self.next_generation.get();
        self.next_generation.set(generation + 1);
        *self.slot.borrow_mut() = Some((generation, Rc::new(callback)));
        Subscription {
            provider: Rc::downgrade(self),
            generation,
        }
    }

    fn unsubscribe(&self, generation: u64) {
        let mut slot = self.slot.borrow_mut();
        if slot.as_ref().is_some_and(|(g, _)| *g == generation) {
            *slot = None;
        }
    }

    fn emit(&self, path: &Path) {
        let callback = self.slot.borrow().as_ref().map(|(_, cb)| Rc::clone(cb));
        if let Some(callback) = callback {
            callback(path);
        }
    }
}

/// Read-only observer that mirrors Git status onto tree entries.
pub struct DecorationProvider<S: ChangeSource> {
    source: S,
    /// "Does this path belong to the tree" — supplied by the tree core.
    should_decorate: Box<dyn Fn(&Path) -> bool>,
    invalidations: Rc<InvalidationSlot>,
}

impl<S: ChangeSource> DecorationProvider<S> {
    pub fn new(source: S, should_decorate: impl Fn(&Path) -> bool + 'static) -> Self {
        Self {
            source,
            should_decorate: Box::new(should_decorate),
            invalidations: Rc::new(InvalidationSlot::new()),
        }
    }

    /// Install the host's invalidation callback. Single subscriber slot.
    pub fn on_invalidate(&self, callback: impl Fn(&Path) + 'static) -> Subscription {
        self.invalidations.subscribe(callback)
    }

    /// The decoration for `path`, or `None` when the path is not in the
    /// tree or the repository reports no change for it. Working-tree status
    /// takes precedence over index status.
    pub fn decoration(&self, path: &Path) -> Option<Decoration> {
        if !(self.should_decorate)(path) {
            return None;
        }
        self.status_of(path).map(FileStatus::decoration)
    }

    /// Re-emit invalidations after the repository reports a state change.
    /// Only paths the tree owns are re-announced.
    pub fn on_repository_changed(&self) {
        let mut announced: Vec<PathBuf> = Vec::new();
        for change in self
            .source
            .working_tree_changes()
            .into_iter()
            .chain(self.source.index_changes())
        {
            if announced.contains(&change.path) || !(self.should_decorate)(&change.path) {
                continue;
            }
            self.invalidations.emit(&change.path);
            announced.push(change.path);
        }
        debug!(paths = announced.len(), "re-announced decorations");
    }

    fn status_of(&self, path: &Path) -> Option<FileStatus> {
        let working = self
            .source
            .working_tree_changes()
            .into_iter()
            .find(|c| c.path == path);
        if let Some(change) = working {
            return Some(change.status);
        }
        self.source
            .index_changes()
            .into_iter()
            .find(|c| c.path == path)
            .map(|c| c.status)
    }
}
