//! Multi-session flows over one workspace: the sidecar is the only thing
//! that survives between sessions, so these tests drive the public command
//! surface end to end and restart against the same backing file.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tree_core::{
    Collapsible, Config, HostPrompts, NodeKind, SidecarStore, TreeController, Workspace, tree_item,
};

/// Scripted host dialogs: one pick and one label answer per session.
#[derive(Default)]
struct Prompts {
    pick: RefCell<Option<Vec<PathBuf>>>,
    label: RefCell<Option<String>>,
}

impl Prompts {
    fn picking(mut self, files: Vec<PathBuf>) -> Self {
        self.pick = RefCell::new(Some(files));
        self
    }

    fn answering(mut self, label: &str) -> Self {
        self.label = RefCell::new(Some(label.to_string()));
        self
    }
}

impl HostPrompts for Prompts {
    fn pick_files(&self) -> Option<Vec<PathBuf>> {
        self.pick.borrow_mut().take()
    }

    fn prompt_label(&self, _purpose: &str) -> Option<String> {
        self.label.borrow_mut().take()
    }
}

fn open(dir: &TempDir, prompts: Prompts) -> Workspace<Prompts> {
    Workspace::new(
        Config::new(dir.path()),
        TreeController::new(SidecarStore::new(dir.path())),
        prompts,
    )
}

#[test]
fn organize_then_reopen_workspace() {
    let dir = TempDir::new().unwrap();
    let picked = dir.path().join("src/main.rs");

    // Session one: a filter holding one file reference, left expanded.
    {
        let prompts = Prompts::default()
            .answering("sources")
            .picking(vec![picked.clone()]);
        let mut ws = open(&dir, prompts);

        let filter = ws.add_filter(None).unwrap().unwrap();
        ws.focus(Some(filter.clone()));
        let added = ws.add_file_reference(None).unwrap();
        assert_eq!(added.len(), 1);
        ws.toggle_expand(Some(filter));
    }

    // Session two: everything reloads from the sidecar.
    let mut ws = open(&dir, Prompts::default());
    let children = ws.controller().children(None);
    assert_eq!(children.len(), 1);
    let filter = children[0];
    assert_eq!(filter.label, "sources");
    assert_eq!(filter.kind, NodeKind::Filter);
    assert!(filter.expanded);
    assert_eq!(tree_item(filter).collapsible, Collapsible::Expanded);
    let filter_id = filter.id().clone();

    let files = ws.controller().children(Some(&filter_id));
    assert_eq!(files.len(), 1);
    let file = files[0];
    assert_eq!(file.label, "main.rs");
    let item = tree_item(file);
    assert_eq!(item.collapsible, Collapsible::None);
    assert_eq!(item.command.unwrap().argument, picked.to_string_lossy());

    // The decoration predicate sees the reloaded tree.
    assert!(ws.controller().locate(&picked));
    assert!(!ws.controller().locate(Path::new("/elsewhere/main.rs")));

    // Removing the filter cascades through the file reference.
    ws.remove_node(Some(filter_id)).unwrap();
    assert!(ws.controller().children(None).is_empty());

    // Session three: the cascade was persisted too.
    let ws = open(&dir, Prompts::default());
    assert!(ws.controller().children(None).is_empty());
    assert!(!ws.controller().locate(&picked));
}

#[test]
fn dismissed_dialogs_leave_no_trace_on_disk() {
    let dir = TempDir::new().unwrap();

    {
        // No scripted answers: every dialog is dismissed.
        let mut ws = open(&dir, Prompts::default());
        assert!(ws.add_filter(None).unwrap().is_none());
        assert!(ws.add_file_reference(None).unwrap().is_empty());
    }

    let ws = open(&dir, Prompts::default());
    assert!(ws.controller().children(None).is_empty());
}
