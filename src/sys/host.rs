//! The compositor as seen by the layout engine.
//!
//! The engine never owns windows, workspaces or monitors. It refers to them by
//! id and asks the [`Host`] about them every time it needs to; any id may have
//! been destroyed since it was last seen, so every query is fallible.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::{Insets, Rect, Size};
use crate::layout_engine::Direction;

/// Non-owning handle to a compositor window.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn new(raw: u64) -> Self { Self(raw) }

    pub const fn get(self) -> u64 { self.0 }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:x}", self.0) }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspaceId(i64);

impl WorkspaceId {
    pub const fn new(raw: i64) -> Self { Self(raw) }

    pub const fn get(self) -> i64 { self.0 }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonitorId(u64);

impl MonitorId {
    pub const fn new(raw: u64) -> Self { Self(raw) }

    pub const fn get(self) -> u64 { self.0 }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FullscreenMode {
    #[default]
    None,
    /// Covers the usable area of the monitor, reserved zones excluded.
    Maximized,
    /// Covers the whole monitor.
    Fullscreen,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonitorInfo {
    pub id: MonitorId,
    /// Full monitor rectangle in layout coordinates.
    pub frame: Rect,
    /// Exclusive zones claimed by bars and panels.
    pub reserved: Insets,
    pub active_workspace: Option<WorkspaceId>,
    pub active_special_workspace: Option<WorkspaceId>,
}

impl MonitorInfo {
    /// The monitor frame minus its reserved insets.
    pub fn usable_area(&self) -> Rect { self.frame.inset(self.reserved) }
}

/// Size constraints configured for a window by rules.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SizeLimits {
    pub min: Option<Size>,
    pub max: Option<Size>,
}

/// Everything the engine needs from the compositor.
///
/// Methods taking a [`WindowId`] must tolerate ids that no longer refer to a
/// live window; queries return a neutral value and mutations do nothing.
pub trait Host {
    // Windows.

    /// Whether the window still exists and is mapped.
    fn window_is_valid(&self, wid: WindowId) -> bool;
    fn window_workspace(&self, wid: WindowId) -> Option<WorkspaceId>;
    fn window_monitor(&self, wid: WindowId) -> Option<MonitorId>;
    fn window_is_floating(&self, wid: WindowId) -> bool;
    fn window_is_fullscreen(&self, wid: WindowId) -> bool;
    /// Space taken by the window's own decorations around its content.
    fn window_reserved_area(&self, wid: WindowId) -> Insets;
    fn window_border_size(&self, wid: WindowId) -> f64;
    fn window_size_limits(&self, wid: WindowId) -> SizeLimits;
    /// Goal of the (possibly animating) rendered geometry.
    fn window_goal_geometry(&self, wid: WindowId) -> Option<Rect>;
    fn last_floating_geometry(&self, wid: WindowId) -> Option<Rect>;
    fn save_floating_geometry(&mut self, wid: WindowId, rect: Rect);
    /// Logical geometry assigned by the layout, before gaps and decorations.
    fn set_window_layout_geometry(&mut self, wid: WindowId, rect: Rect);
    /// Rendered geometry; the host animates towards it.
    fn set_window_goal_geometry(&mut self, wid: WindowId, rect: Rect);
    /// Skip any running animation and jump to the goal geometry.
    fn warp_window(&mut self, wid: WindowId);
    fn update_decorations(&mut self, wid: WindowId);
    /// Drop per-window property overrides applied at layout priority.
    fn reset_layout_rules(&mut self, wid: WindowId);
    fn set_fullscreen_mode(&mut self, wid: WindowId, mode: FullscreenMode);
    fn raise_window(&mut self, wid: WindowId);
    fn move_window_to_workspace(&mut self, wid: WindowId, workspace: WorkspaceId);
    fn focus_window(&mut self, wid: WindowId);
    fn damage_window(&mut self, wid: WindowId);
    /// Nearest window in a direction, as computed by the compositor.
    fn window_in_direction(&self, wid: WindowId, direction: Direction) -> Option<WindowId>;
    /// Windows that should be tiled when the layout becomes active: mapped,
    /// visible and not floating.
    fn tileable_windows(&self) -> Vec<WindowId>;

    // Workspaces.

    fn workspace_monitor(&self, workspace: WorkspaceId) -> Option<MonitorId>;
    fn workspace_is_special(&self, workspace: WorkspaceId) -> bool;
    fn workspace_fullscreen(&self, workspace: WorkspaceId) -> Option<(WindowId, FullscreenMode)>;
    fn workspace_windows_changed(&mut self, workspace: WorkspaceId);

    // Monitors.

    fn monitor(&self, id: MonitorId) -> Option<MonitorInfo>;
    fn monitors(&self) -> Vec<MonitorId>;
    fn focused_monitor(&self) -> Option<MonitorId>;
    fn focus_monitor(&mut self, id: MonitorId);
    fn damage_monitor(&mut self, id: MonitorId);
}
