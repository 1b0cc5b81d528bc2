use serde::{Deserialize, Serialize};

use crate::sys::geometry::Rect;
use crate::sys::host::WindowId;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StackRole {
    Main,
    Secondary,
}

impl StackRole {
    pub fn other(self) -> StackRole {
        match self {
            StackRole::Main => StackRole::Secondary,
            StackRole::Secondary => StackRole::Main,
        }
    }
}

/// Placement record of one tiled window.
///
/// Equality is identity of the referenced window; geometry and weight are
/// scratch state and do not take part in it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Node {
    pub window: WindowId,
    /// Last computed rectangle, overwritten on every layout pass.
    pub rect: Rect,
    /// Share of the stack's split axis, relative to the other nodes.
    pub weight: f64,
}

impl Node {
    pub fn new(window: WindowId) -> Self {
        Self { window, rect: Rect::default(), weight: 1.0 }
    }

    pub fn placement(&self) -> Placement {
        Placement {
            window: self.window,
            rect: self.rect,
            ignore_fullscreen_checks: false,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool { self.window == other.window }
}

impl Eq for Node {}

/// Transient node covering a fullscreen or maximized window.
///
/// Never stored in a stack; it only exists to route the window through the
/// regular rectangle applier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FakeNode {
    pub window: WindowId,
    pub rect: Rect,
}

impl FakeNode {
    pub fn new(window: WindowId, rect: Rect) -> Self { Self { window, rect } }

    pub fn placement(&self) -> Placement {
        Placement {
            window: self.window,
            rect: self.rect,
            ignore_fullscreen_checks: true,
        }
    }
}

/// What the applier needs to know about a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub window: WindowId,
    pub rect: Rect,
    pub ignore_fullscreen_checks: bool,
}
