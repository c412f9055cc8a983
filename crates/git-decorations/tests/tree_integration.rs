//! End-to-end wiring of the decoration provider against the real tree core:
//! `locate` is the predicate that decides which repository changes surface
//! as badges.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use git_decorations::{Change, ChangeSource, ColorToken, DecorationProvider, FileStatus};
use tempfile::TempDir;
use tree_core::{SidecarStore, TreeController};

struct FakeRepo {
    working: Vec<Change>,
    index: Vec<Change>,
}

impl ChangeSource for FakeRepo {
    fn working_tree_changes(&self) -> Vec<Change> {
        self.working.clone()
    }

    fn index_changes(&self) -> Vec<Change> {
        self.index.clone()
    }
}

#[test]
fn decorations_follow_tree_membership() {
    let dir = TempDir::new().unwrap();
    let mut controller = TreeController::new(SidecarStore::new(dir.path()));
    let root = controller.root().id().clone();

    let filter = controller.add_filter(&root, "sources").unwrap();
    controller
        .add_file(&filter, "main.rs", "/ws/src/main.rs")
        .unwrap();

    let repo = FakeRepo {
        working: vec![
            Change {
                path: PathBuf::from("/ws/src/main.rs"),
                status: FileStatus::Modified,
            },
            Change {
                path: PathBuf::from("/ws/src/ignored_by_tree.rs"),
                status: FileStatus::Modified,
            },
        ],
        index: vec![Change {
            path: PathBuf::from("/ws/src/main.rs"),
            status: FileStatus::IndexModified,
        }],
    };

    // The tree hands the decoration layer exactly one thing: the locate
    // predicate. Snapshot the document so the closure owns its data.
    let document = controller.document().clone();
    let provider = DecorationProvider::new(repo, move |path: &Path| {
        document.iter().any(|node| node.targets(path))
    });

    // Tree member with a working-tree change: decorated, working tree wins.
    let deco = provider.decoration(Path::new("/ws/src/main.rs")).unwrap();
    assert_eq!(deco.badge, 'M');
    assert_eq!(deco.color, ColorToken::Modified);

    // Changed on disk but not referenced by any filter: no badge.
    assert!(
        provider
            .decoration(Path::new("/ws/src/ignored_by_tree.rs"))
            .is_none()
    );

    // Repository change events only re-announce tree members.
    let seen: Rc<RefCell<Vec<PathBuf>>> = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = Rc::clone(&seen);
    let _sub = provider.on_invalidate(move |path| seen_clone.borrow_mut().push(path.into()));
    provider.on_repository_changed();
    assert_eq!(*seen.borrow(), vec![PathBuf::from("/ws/src/main.rs")]);
}
