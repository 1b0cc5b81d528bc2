//! Which window sits in which stack of which workspace.
//!
//! Two parallel maps hold the ordered main and secondary stacks per workspace.
//! A membership index maps every tiled window to its workspace and role so
//! that lookups do not scan every stack; the index is kept in lock-step with
//! the stacks by every mutating method, and a window is never present twice.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::node::{Node, StackRole};
use crate::common::collections::HashMap;
use crate::sys::host::{WindowId, WorkspaceId};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeLocation {
    pub workspace: WorkspaceId,
    pub role: StackRole,
    pub index: usize,
}

#[derive(Debug, Default)]
pub struct StackStore {
    main: HashMap<WorkspaceId, Vec<Node>>,
    secondary: HashMap<WorkspaceId, Vec<Node>>,
    membership: HashMap<WindowId, (WorkspaceId, StackRole)>,
}

impl StackStore {
    pub fn new() -> Self { Self::default() }

    fn map(&self, role: StackRole) -> &HashMap<WorkspaceId, Vec<Node>> {
        match role {
            StackRole::Main => &self.main,
            StackRole::Secondary => &self.secondary,
        }
    }

    fn map_mut(&mut self, role: StackRole) -> &mut HashMap<WorkspaceId, Vec<Node>> {
        match role {
            StackRole::Main => &mut self.main,
            StackRole::Secondary => &mut self.secondary,
        }
    }

    /// The nodes of one stack; unknown workspaces have empty stacks.
    pub fn stack(&self, role: StackRole, workspace: WorkspaceId) -> &[Node] {
        self.map(role).get(&workspace).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Both stacks of a workspace for in-place geometry updates. Creates the
    /// workspace's entries on first use.
    pub fn stacks_mut(&mut self, workspace: WorkspaceId) -> (&mut [Node], &mut [Node]) {
        let main = self.main.entry(workspace).or_default();
        let secondary = self.secondary.entry(workspace).or_default();
        (main.as_mut_slice(), secondary.as_mut_slice())
    }

    pub fn stack_len(&self, role: StackRole, workspace: WorkspaceId) -> usize {
        self.stack(role, workspace).len()
    }

    pub fn windows(&self, role: StackRole, workspace: WorkspaceId) -> Vec<WindowId> {
        self.stack(role, workspace).iter().map(|n| n.window).collect()
    }

    pub fn contains(&self, wid: WindowId) -> bool { self.membership.contains_key(&wid) }

    pub fn find(&self, wid: WindowId) -> Option<NodeLocation> {
        let &(workspace, role) = self.membership.get(&wid)?;
        let index = self.stack(role, workspace).iter().position(|n| n.window == wid)?;
        Some(NodeLocation { workspace, role, index })
    }

    pub fn node(&self, wid: WindowId) -> Option<&Node> {
        let loc = self.find(wid)?;
        self.stack(loc.role, loc.workspace).get(loc.index)
    }

    pub fn node_mut(&mut self, wid: WindowId) -> Option<&mut Node> {
        let loc = self.find(wid)?;
        self.map_mut(loc.role).get_mut(&loc.workspace)?.get_mut(loc.index)
    }

    /// Appends a node to the tail of a stack. Refuses windows that are
    /// already tiled anywhere.
    pub fn push(&mut self, workspace: WorkspaceId, role: StackRole, node: Node) -> bool {
        if let Some(&(ws, r)) = self.membership.get(&node.window) {
            warn!(
                "Window {} is already tiled in the {:?} stack of workspace {}",
                node.window, r, ws
            );
            return false;
        }
        self.membership.insert(node.window, (workspace, role));
        self.map_mut(role).entry(workspace).or_default().push(node);
        true
    }

    pub fn remove(&mut self, wid: WindowId) -> Option<(NodeLocation, Node)> {
        let loc = self.find(wid)?;
        let node = self.map_mut(loc.role).get_mut(&loc.workspace)?.remove(loc.index);
        self.membership.remove(&wid);
        Some((loc, node))
    }

    /// Moves the tail of the secondary stack to the tail of the main stack.
    pub fn promote_secondary_tail(&mut self, workspace: WorkspaceId) -> Option<WindowId> {
        let node = self.secondary.get_mut(&workspace)?.pop()?;
        let wid = node.window;
        self.membership.insert(wid, (workspace, StackRole::Main));
        self.main.entry(workspace).or_default().push(node);
        Some(wid)
    }

    /// Promotes secondary nodes until the main stack holds `minimum` nodes or
    /// the secondary stack runs dry. Returns the promoted windows.
    pub fn fill_main_to(&mut self, workspace: WorkspaceId, minimum: usize) -> Vec<WindowId> {
        let mut promoted = Vec::new();
        while self.stack_len(StackRole::Main, workspace) < minimum {
            match self.promote_secondary_tail(workspace) {
                Some(wid) => promoted.push(wid),
                None => break,
            }
        }
        promoted
    }

    /// Exchanges the positions of two tiled windows, possibly across stacks
    /// and workspaces. Each node keeps its weight and travels with its window.
    pub fn swap(&mut self, a: WindowId, b: WindowId) -> Option<(NodeLocation, NodeLocation)> {
        let loc_a = self.find(a)?;
        let loc_b = self.find(b)?;
        if loc_a == loc_b {
            return Some((loc_a, loc_b));
        }

        if loc_a.role == loc_b.role && loc_a.workspace == loc_b.workspace {
            self.map_mut(loc_a.role).get_mut(&loc_a.workspace)?.swap(loc_a.index, loc_b.index);
        } else {
            let node_a = self.map(loc_a.role).get(&loc_a.workspace)?.get(loc_a.index)?.clone();
            let node_b = self.map(loc_b.role).get(&loc_b.workspace)?.get(loc_b.index)?.clone();
            self.map_mut(loc_a.role).get_mut(&loc_a.workspace)?[loc_a.index] = node_b;
            self.map_mut(loc_b.role).get_mut(&loc_b.workspace)?[loc_b.index] = node_a;
        }

        self.membership.insert(a, (loc_b.workspace, loc_b.role));
        self.membership.insert(b, (loc_a.workspace, loc_a.role));
        Some((loc_a, loc_b))
    }

    /// Points the node of `from` at `to`. `to` must not already be tiled.
    pub fn replace_window(&mut self, from: WindowId, to: WindowId) -> Option<NodeLocation> {
        if self.contains(to) {
            warn!("Cannot hand node of {} to {}: target is already tiled", from, to);
            return None;
        }
        let loc = self.find(from)?;
        let node = self.map_mut(loc.role).get_mut(&loc.workspace)?.get_mut(loc.index)?;
        node.window = to;
        self.membership.remove(&from);
        self.membership.insert(to, (loc.workspace, loc.role));
        Some(loc)
    }

    /// Drops every node on the workspace whose window fails `is_live`.
    pub fn prune(
        &mut self,
        workspace: WorkspaceId,
        mut is_live: impl FnMut(WindowId) -> bool,
    ) -> Vec<WindowId> {
        let mut dropped = Vec::new();
        for role in [StackRole::Main, StackRole::Secondary] {
            if let Some(stack) = self.map_mut(role).get_mut(&workspace) {
                stack.retain(|node| {
                    let live = is_live(node.window);
                    if !live {
                        dropped.push(node.window);
                    }
                    live
                });
            }
        }
        for wid in &dropped {
            self.membership.remove(wid);
        }
        dropped
    }

    pub fn clear(&mut self) {
        self.main.clear();
        self.secondary.clear();
        self.membership.clear();
    }
}
