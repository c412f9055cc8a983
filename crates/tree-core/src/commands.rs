//! Command-style entry points exposed to the host.
//!
//! Each command takes an optional target node and falls back to the last
//! focused node, then the root. Interaction steps the host owns — the
//! open-file dialog and the label prompt — sit behind [`HostPrompts`]; a
//! dismissed prompt answers `None` and the command applies no mutation, so
//! cancellation never leaves partial state behind.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::controller::{TreeController, TreeError};
use crate::node::{NodeId, NodeKind};

/// Host-owned interaction steps.
///
/// The host implements this over its own dialog APIs; tests substitute a
/// scripted fake.
pub trait HostPrompts {
    /// Open-file dialog. `None` when the user dismisses it.
    fn pick_files(&self) -> Option<Vec<PathBuf>>;

    /// Single-line text prompt for a label. `None` when dismissed.
    fn prompt_label(&self, purpose: &str) -> Option<String>;
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("{0} is outside the workspace")]
    OutsideWorkspace(PathBuf),
}

/// The per-workspace façade the host binds commands to: configuration, the
/// controller, the host's prompt implementations, and focus tracking.
pub struct Workspace<P: HostPrompts> {
    config: Config,
    controller: TreeController,
    prompts: P,
    last_focused: Option<NodeId>,
}

impl<P: HostPrompts> Workspace<P> {
    pub fn new(config: Config, controller: TreeController, prompts: P) -> Self {
        Self {
            config,
            controller,
            prompts,
            last_focused: None,
        }
    }

    pub fn controller(&self) -> &TreeController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut TreeController {
        &mut self.controller
    }

    /// Record which node the user last selected in the view.
    pub fn focus(&mut self, node: Option<NodeId>) {
        self.last_focused = node;
    }

    /// Re-emit "data changed" and persist. `None` means everything.
    pub fn refresh(&mut self, target: Option<NodeId>) {
        self.controller.refresh(target.as_ref());
    }

    /// Add references to host-picked files under the target container.
    ///
    /// The whole pick is rejected if any chosen file lies outside the
    /// workspace: nothing is inserted and the offending path is reported.
    /// A dismissed dialog inserts nothing.
    pub fn add_file_reference(
        &mut self,
        target: Option<NodeId>,
    ) -> Result<Vec<NodeId>, CommandError> {
        let parent = self.anchor_container(target);

        let Some(picked) = self.prompts.pick_files() else {
            debug!("file pick dismissed, nothing added");
            return Ok(Vec::new());
        };

        if let Some(outside) = picked.iter().find(|p| !self.config.contains(p)) {
            warn!(path = %outside.display(), "rejected file outside the workspace");
            return Err(CommandError::OutsideWorkspace(outside.clone()));
        }

        let mut added = Vec::with_capacity(picked.len());
        for path in picked {
            let label = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            let target = path.to_string_lossy().into_owned();
            added.push(self.controller.add_file(&parent, &label, &target)?);
        }
        Ok(added)
    }

    /// Prompt for a label and add an empty filter under the target
    /// container. A dismissed prompt adds nothing.
    pub fn add_filter(&mut self, target: Option<NodeId>) -> Result<Option<NodeId>, CommandError> {
        let parent = self.anchor_container(target);

        let Some(label) = self.prompts.prompt_label("Filter name") else {
            debug!("filter prompt dismissed, nothing added");
            return Ok(None);
        };

        let id = self.controller.add_filter(&parent, &label)?;
        Ok(Some(id))
    }

    /// Remove the target node (and its subtree).
    pub fn remove_node(&mut self, target: Option<NodeId>) -> Result<(), CommandError> {
        let id = self.resolve_target(target);
        self.controller.remove(&id)?;
        if self.last_focused.as_ref() == Some(&id) {
            self.last_focused = None;
        }
        Ok(())
    }

    /// Flip the collapse state of the target container.
    pub fn toggle_expand(&mut self, target: Option<NodeId>) {
        let id = self.resolve_target(target);
        let Some(expanded) = self.controller.document().get(&id).map(|n| n.expanded) else {
            warn!(node = %id, "toggle requested for unknown node");
            return;
        };
        self.controller.set_expanded(&id, !expanded);
    }

    /// Explicit target, else last focused (if it still exists), else root.
    fn resolve_target(&self, target: Option<NodeId>) -> NodeId {
        target
            .filter(|id| self.controller.document().contains(id))
            .or_else(|| {
                self.last_focused
                    .clone()
                    .filter(|id| self.controller.document().contains(id))
            })
            .unwrap_or_else(|| self.controller.root().id().clone())
    }

    /// Like `resolve_target`, but climbs to the nearest container: adding
    /// "at" a file means adding next to it, inside its filter.
    fn anchor_container(&self, target: Option<NodeId>) -> NodeId {
        let id = self.resolve_target(target);
        let doc = self.controller.document();
        match doc.get(&id) {
            Some(node) if node.kind == NodeKind::File => node
                .parent
                .clone()
                .unwrap_or_else(|| doc.root_id().clone()),
            _ => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SidecarStore;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Scripted prompt fake: pops pre-seeded answers, `None` = dismissed.
    #[derive(Default)]
    struct FakePrompts {
        picks: RefCell<Vec<Option<Vec<PathBuf>>>>,
        labels: RefCell<Vec<Option<String>>>,
    }

    impl FakePrompts {
        fn will_pick(self, files: Option<Vec<PathBuf>>) -> Self {
            self.picks.borrow_mut().push(files);
            self
        }

        fn will_answer(self, label: Option<&str>) -> Self {
            self.labels.borrow_mut().push(label.map(String::from));
            self
        }
    }

    impl HostPrompts for FakePrompts {
        fn pick_files(&self) -> Option<Vec<PathBuf>> {
            self.picks.borrow_mut().pop().unwrap_or(None)
        }

        fn prompt_label(&self, _purpose: &str) -> Option<String> {
            self.labels.borrow_mut().pop().unwrap_or(None)
        }
    }

    fn workspace(prompts: FakePrompts) -> (Workspace<FakePrompts>, TempDir) {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());
        let controller = TreeController::new(SidecarStore::new(dir.path()));
        (Workspace::new(config, controller, prompts), dir)
    }

    #[test]
    fn test_add_filter_via_prompt() {
        let (mut ws, _dir) = workspace(FakePrompts::default().will_answer(Some("notes")));

        let id = ws.add_filter(None).unwrap().unwrap();
        assert_eq!(ws.controller().document().get(&id).unwrap().label, "notes");
        assert_eq!(ws.controller().children(None).len(), 1);
    }

    #[test]
    fn test_dismissed_prompt_adds_nothing() {
        let (mut ws, _dir) = workspace(FakePrompts::default().will_answer(None));

        assert!(ws.add_filter(None).unwrap().is_none());
        assert!(ws.controller().children(None).is_empty());
    }

    #[test]
    fn test_separator_label_is_rejected() {
        let (mut ws, _dir) = workspace(FakePrompts::default().will_answer(Some("a/b")));

        assert!(matches!(
            ws.add_filter(None),
            Err(CommandError::Tree(TreeError::Label(_)))
        ));
        assert!(ws.controller().children(None).is_empty());
    }

    #[test]
    fn test_add_file_reference_inside_workspace() {
        let (mut ws, dir) = workspace(FakePrompts::default());
        let inside = dir.path().join("src/main.rs");
        ws.prompts = FakePrompts::default().will_pick(Some(vec![inside.clone()]));

        let added = ws.add_file_reference(None).unwrap();
        assert_eq!(added.len(), 1);
        let node = ws.controller().document().get(&added[0]).unwrap();
        assert_eq!(node.label, "main.rs");
        assert_eq!(node.target, inside.to_string_lossy());
    }

    #[test]
    fn test_file_outside_workspace_rejects_whole_pick() {
        let (mut ws, dir) = workspace(FakePrompts::default());
        let inside = dir.path().join("ok.rs");
        ws.prompts = FakePrompts::default()
            .will_pick(Some(vec![inside, PathBuf::from("/elsewhere/evil.rs")]));

        assert!(matches!(
            ws.add_file_reference(None),
            Err(CommandError::OutsideWorkspace(_))
        ));
        assert!(ws.controller().children(None).is_empty());
    }

    #[test]
    fn test_dismissed_pick_adds_nothing() {
        let (mut ws, _dir) = workspace(FakePrompts::default().will_pick(None));
        assert!(ws.add_file_reference(None).unwrap().is_empty());
        assert!(ws.controller().children(None).is_empty());
    }

    #[test]
    fn test_commands_fall_back_to_last_focused() {
        let (mut ws, _dir) = workspace(FakePrompts::default().will_answer(Some("inner")));
        let root = ws.controller().root().id().clone();
        let outer = ws.controller_mut().add_filter(&root, "outer").unwrap();

        ws.focus(Some(outer.clone()));
        let inner = ws.add_filter(None).unwrap().unwrap();

        assert_eq!(
            ws.controller().document().get(&inner).unwrap().parent.as_ref(),
            Some(&outer)
        );
    }

    #[test]
    fn test_add_at_file_anchors_to_its_filter() {
        let (mut ws, dir) = workspace(FakePrompts::default().will_answer(Some("sibling")));
        let root = ws.controller().root().id().clone();
        let filter = ws.controller_mut().add_filter(&root, "outer").unwrap();
        let file_path = dir.path().join("a.rs");
        let file = ws
            .controller_mut()
            .add_file(&filter, "a.rs", &file_path.to_string_lossy())
            .unwrap();

        let sibling = ws.add_filter(Some(file)).unwrap().unwrap();
        assert_eq!(
            ws.controller().document().get(&sibling).unwrap().parent.as_ref(),
            Some(&filter)
        );
    }

    #[test]
    fn test_remove_node_clears_focus() {
        let (mut ws, _dir) = workspace(FakePrompts::default());
        let root = ws.controller().root().id().clone();
        let filter = ws.controller_mut().add_filter(&root, "notes").unwrap();

        ws.focus(Some(filter.clone()));
        ws.remove_node(Some(filter.clone())).unwrap();

        assert!(!ws.controller().document().contains(&filter));
        // Subsequent unanchored commands land on the root again.
        ws.prompts = FakePrompts::default().will_answer(Some("fresh"));
        let fresh = ws.add_filter(None).unwrap().unwrap();
        assert_eq!(
            ws.controller().document().get(&fresh).unwrap().parent.as_ref(),
            Some(&root)
        );
    }

    #[test]
    fn test_remove_without_target_hits_root_and_is_rejected() {
        let (mut ws, _dir) = workspace(FakePrompts::default());
        assert!(matches!(
            ws.remove_node(None),
            Err(CommandError::Tree(TreeError::RootIsImmovable))
        ));
    }

    #[test]
    fn test_toggle_expand() {
        let (mut ws, _dir) = workspace(FakePrompts::default());
        let root = ws.controller().root().id().clone();
        let filter = ws.controller_mut().add_filter(&root, "notes").unwrap();

        ws.toggle_expand(Some(filter.clone()));
        assert!(ws.controller().document().get(&filter).unwrap().expanded);
        ws.toggle_expand(Some(filter.clone()));
        assert!(!ws.controller().document().get(&filter).unwrap().expanded);
    }
}
