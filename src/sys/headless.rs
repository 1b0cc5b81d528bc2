//! In-memory compositor.
//!
//! Keeps just enough window, workspace and monitor state to drive the layout
//! engine without a display server, and records what the engine asked for.

use serde::Serialize;

use super::geometry::{Insets, Rect};
use super::host::{
    FullscreenMode, Host, MonitorId, MonitorInfo, SizeLimits, WindowId, WorkspaceId,
};
use crate::common::collections::{BTreeMap, HashMap};
use crate::layout_engine::Direction;

#[derive(Clone, Debug, PartialEq)]
pub struct HeadlessWindow {
    pub workspace: WorkspaceId,
    pub mapped: bool,
    pub hidden: bool,
    pub floating: bool,
    pub fullscreen: FullscreenMode,
    pub reserved: Insets,
    pub border: f64,
    pub limits: SizeLimits,
    pub layout_geometry: Option<Rect>,
    pub goal_geometry: Option<Rect>,
    pub floating_geometry: Option<Rect>,
    pub rule_resets: usize,
    pub decoration_updates: usize,
    pub warps: usize,
    pub damage: usize,
    pub raises: usize,
}

impl HeadlessWindow {
    fn new(workspace: WorkspaceId) -> Self {
        Self {
            workspace,
            mapped: true,
            hidden: false,
            floating: false,
            fullscreen: FullscreenMode::None,
            reserved: Insets::default(),
            border: 0.0,
            limits: SizeLimits::default(),
            layout_geometry: None,
            goal_geometry: None,
            floating_geometry: None,
            rule_resets: 0,
            decoration_updates: 0,
            warps: 0,
            damage: 0,
            raises: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct HeadlessWorkspace {
    monitor: Option<MonitorId>,
    special: bool,
}

/// Side effects the engine requested that do not show up as window state.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum HostEvent {
    WorkspaceWindowsChanged(WorkspaceId),
    MonitorDamaged(MonitorId),
    MonitorFocused(MonitorId),
    WindowFocused(WindowId),
    WindowMoved { window: WindowId, workspace: WorkspaceId },
}

#[derive(Debug, Default)]
pub struct HeadlessHost {
    windows: BTreeMap<WindowId, HeadlessWindow>,
    workspaces: BTreeMap<WorkspaceId, HeadlessWorkspace>,
    monitors: BTreeMap<MonitorId, MonitorInfo>,
    neighbors: HashMap<(WindowId, Direction), WindowId>,
    focused_monitor: Option<MonitorId>,
    focused_window: Option<WindowId>,
    next_window: u64,
    next_monitor: u64,
    pub events: Vec<HostEvent>,
}

impl HeadlessHost {
    pub fn new() -> Self { Self::default() }

    /// Adds a monitor. The first monitor added gets focus.
    pub fn add_monitor(&mut self, frame: Rect, reserved: Insets) -> MonitorId {
        self.next_monitor += 1;
        let id = MonitorId::new(self.next_monitor);
        self.monitors.insert(id, MonitorInfo {
            id,
            frame,
            reserved,
            active_workspace: None,
            active_special_workspace: None,
        });
        self.focused_monitor.get_or_insert(id);
        id
    }

    /// Adds a regular workspace on a monitor, making it active there if the
    /// monitor shows nothing yet.
    pub fn add_workspace(&mut self, workspace: WorkspaceId, monitor: MonitorId) {
        self.workspaces.insert(workspace, HeadlessWorkspace { monitor: Some(monitor), special: false });
        if let Some(info) = self.monitors.get_mut(&monitor) {
            info.active_workspace.get_or_insert(workspace);
        }
    }

    /// Adds a special workspace. It has no monitor until one opens it.
    pub fn add_special_workspace(&mut self, workspace: WorkspaceId) {
        self.workspaces.insert(workspace, HeadlessWorkspace { monitor: None, special: true });
    }

    pub fn activate_workspace(&mut self, monitor: MonitorId, workspace: WorkspaceId) {
        if let Some(info) = self.monitors.get_mut(&monitor) {
            info.active_workspace = Some(workspace);
        }
        if let Some(ws) = self.workspaces.get_mut(&workspace) {
            ws.monitor = Some(monitor);
        }
    }

    pub fn open_special_workspace(&mut self, monitor: MonitorId, workspace: WorkspaceId) {
        if let Some(info) = self.monitors.get_mut(&monitor) {
            info.active_special_workspace = Some(workspace);
        }
    }

    /// Maps a new tiled window on a workspace.
    pub fn add_window(&mut self, workspace: WorkspaceId) -> WindowId {
        self.next_window += 1;
        let id = WindowId::new(self.next_window);
        self.windows.insert(id, HeadlessWindow::new(workspace));
        id
    }

    pub fn window(&self, wid: WindowId) -> Option<&HeadlessWindow> { self.windows.get(&wid) }

    fn live_window(&self, wid: WindowId) -> Option<&HeadlessWindow> {
        self.windows.get(&wid).filter(|w| w.mapped)
    }

    fn window_mut(&mut self, wid: WindowId) -> Option<&mut HeadlessWindow> {
        self.windows.get_mut(&wid).filter(|w| w.mapped)
    }

    pub fn window_ids(&self) -> Vec<WindowId> { self.windows.keys().copied().collect() }

    /// Unmaps the window. Its id stays known so stale references can be
    /// detected.
    pub fn destroy_window(&mut self, wid: WindowId) {
        if let Some(window) = self.windows.get_mut(&wid) {
            window.mapped = false;
        }
    }

    pub fn set_floating(&mut self, wid: WindowId, floating: bool) {
        if let Some(window) = self.window_mut(wid) {
            window.floating = floating;
        }
    }

    pub fn set_hidden(&mut self, wid: WindowId, hidden: bool) {
        if let Some(window) = self.window_mut(wid) {
            window.hidden = hidden;
        }
    }

    pub fn set_fullscreen(&mut self, wid: WindowId, mode: FullscreenMode) {
        if let Some(window) = self.window_mut(wid) {
            window.fullscreen = mode;
        }
    }

    pub fn set_reserved_area(&mut self, wid: WindowId, reserved: Insets) {
        if let Some(window) = self.window_mut(wid) {
            window.reserved = reserved;
        }
    }

    pub fn set_border_size(&mut self, wid: WindowId, border: f64) {
        if let Some(window) = self.window_mut(wid) {
            window.border = border;
        }
    }

    pub fn set_size_limits(&mut self, wid: WindowId, limits: SizeLimits) {
        if let Some(window) = self.window_mut(wid) {
            window.limits = limits;
        }
    }

    pub fn set_goal_geometry(&mut self, wid: WindowId, rect: Rect) {
        if let Some(window) = self.window_mut(wid) {
            window.goal_geometry = Some(rect);
        }
    }

    /// Overrides what [`Host::window_in_direction`] answers for one window.
    pub fn set_neighbor(&mut self, wid: WindowId, direction: Direction, neighbor: WindowId) {
        self.neighbors.insert((wid, direction), neighbor);
    }

    pub fn layout_geometry(&self, wid: WindowId) -> Option<Rect> {
        self.windows.get(&wid).and_then(|w| w.layout_geometry)
    }

    pub fn focused_window(&self) -> Option<WindowId> { self.focused_window }

    fn is_visible_workspace(&self, workspace: WorkspaceId) -> bool {
        self.monitors.values().any(|m| {
            m.active_workspace == Some(workspace) || m.active_special_workspace == Some(workspace)
        })
    }

    /// Closest window whose goal geometry lies entirely past the given edge
    /// of `wid`, measured between centers.
    fn nearest_in_direction(&self, wid: WindowId, direction: Direction) -> Option<WindowId> {
        let from = self.live_window(wid)?.goal_geometry?;
        let center = from.mid();
        self.windows
            .iter()
            .filter(|(id, w)| **id != wid && w.mapped && !w.hidden)
            .filter(|(_, w)| self.is_visible_workspace(w.workspace))
            .filter_map(|(id, w)| Some((*id, w.goal_geometry?)))
            .filter(|(_, rect)| match direction {
                Direction::Left => rect.max().x <= from.min().x + 1.0,
                Direction::Right => rect.min().x >= from.max().x - 1.0,
                Direction::Up => rect.max().y <= from.min().y + 1.0,
                Direction::Down => rect.min().y >= from.max().y - 1.0,
            })
            .map(|(id, rect)| {
                let d = rect.mid() - center;
                (id, d.x * d.x + d.y * d.y)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }
}

impl Host for HeadlessHost {
    fn window_is_valid(&self, wid: WindowId) -> bool { self.live_window(wid).is_some() }

    fn window_workspace(&self, wid: WindowId) -> Option<WorkspaceId> {
        self.live_window(wid).map(|w| w.workspace)
    }

    fn window_monitor(&self, wid: WindowId) -> Option<MonitorId> {
        let workspace = self.window_workspace(wid)?;
        let ws = self.workspaces.get(&workspace)?;
        if ws.special {
            self.monitors
                .values()
                .find(|m| m.active_special_workspace == Some(workspace))
                .map(|m| m.id)
        } else {
            ws.monitor
        }
    }

    fn window_is_floating(&self, wid: WindowId) -> bool {
        self.live_window(wid).is_some_and(|w| w.floating)
    }

    fn window_is_fullscreen(&self, wid: WindowId) -> bool {
        self.live_window(wid).is_some_and(|w| w.fullscreen != FullscreenMode::None)
    }

    fn window_reserved_area(&self, wid: WindowId) -> Insets {
        self.live_window(wid).map(|w| w.reserved).unwrap_or_default()
    }

    fn window_border_size(&self, wid: WindowId) -> f64 {
        self.live_window(wid).map(|w| w.border).unwrap_or_default()
    }

    fn window_size_limits(&self, wid: WindowId) -> SizeLimits {
        self.live_window(wid).map(|w| w.limits).unwrap_or_default()
    }

    fn window_goal_geometry(&self, wid: WindowId) -> Option<Rect> {
        self.live_window(wid)?.goal_geometry
    }

    fn last_floating_geometry(&self, wid: WindowId) -> Option<Rect> {
        self.live_window(wid)?.floating_geometry
    }

    fn save_floating_geometry(&mut self, wid: WindowId, rect: Rect) {
        if let Some(window) = self.window_mut(wid) {
            window.floating_geometry = Some(rect);
            window.layout_geometry = Some(rect);
        }
    }

    fn set_window_layout_geometry(&mut self, wid: WindowId, rect: Rect) {
        if let Some(window) = self.window_mut(wid) {
            window.layout_geometry = Some(rect);
        }
    }

    fn set_window_goal_geometry(&mut self, wid: WindowId, rect: Rect) { self.set_goal_geometry(wid, rect); }

    fn warp_window(&mut self, wid: WindowId) {
        if let Some(window) = self.window_mut(wid) {
            window.warps += 1;
        }
    }

    fn update_decorations(&mut self, wid: WindowId) {
        if let Some(window) = self.window_mut(wid) {
            window.decoration_updates += 1;
        }
    }

    fn reset_layout_rules(&mut self, wid: WindowId) {
        if let Some(window) = self.window_mut(wid) {
            window.rule_resets += 1;
        }
    }

    fn set_fullscreen_mode(&mut self, wid: WindowId, mode: FullscreenMode) { self.set_fullscreen(wid, mode); }

    fn raise_window(&mut self, wid: WindowId) {
        if let Some(window) = self.window_mut(wid) {
            window.raises += 1;
        }
    }

    fn move_window_to_workspace(&mut self, wid: WindowId, workspace: WorkspaceId) {
        if let Some(window) = self.window_mut(wid) {
            window.workspace = workspace;
            self.events.push(HostEvent::WindowMoved { window: wid, workspace });
        }
    }

    fn focus_window(&mut self, wid: WindowId) {
        if !self.window_is_valid(wid) {
            return;
        }
        self.focused_window = Some(wid);
        if let Some(monitor) = self.window_monitor(wid) {
            self.focused_monitor = Some(monitor);
        }
        self.events.push(HostEvent::WindowFocused(wid));
    }

    fn damage_window(&mut self, wid: WindowId) {
        if let Some(window) = self.window_mut(wid) {
            window.damage += 1;
        }
    }

    fn window_in_direction(&self, wid: WindowId, direction: Direction) -> Option<WindowId> {
        match self.neighbors.get(&(wid, direction)) {
            Some(neighbor) => Some(*neighbor).filter(|n| self.window_is_valid(*n)),
            None => self.nearest_in_direction(wid, direction),
        }
    }

    fn tileable_windows(&self) -> Vec<WindowId> {
        self.windows
            .iter()
            .filter(|(_, w)| w.mapped && !w.hidden && !w.floating)
            .map(|(id, _)| *id)
            .collect()
    }

    fn workspace_monitor(&self, workspace: WorkspaceId) -> Option<MonitorId> {
        self.workspaces.get(&workspace)?.monitor
    }

    fn workspace_is_special(&self, workspace: WorkspaceId) -> bool {
        self.workspaces.get(&workspace).is_some_and(|ws| ws.special)
    }

    fn workspace_fullscreen(&self, workspace: WorkspaceId) -> Option<(WindowId, FullscreenMode)> {
        self.windows
            .iter()
            .find(|(_, w)| w.mapped && w.workspace == workspace && w.fullscreen != FullscreenMode::None)
            .map(|(id, w)| (*id, w.fullscreen))
    }

    fn workspace_windows_changed(&mut self, workspace: WorkspaceId) {
        self.events.push(HostEvent::WorkspaceWindowsChanged(workspace));
    }

    fn monitor(&self, id: MonitorId) -> Option<MonitorInfo> { self.monitors.get(&id).copied() }

    fn monitors(&self) -> Vec<MonitorId> { self.monitors.keys().copied().collect() }

    fn focused_monitor(&self) -> Option<MonitorId> { self.focused_monitor }

    fn focus_monitor(&mut self, id: MonitorId) {
        if self.monitors.contains_key(&id) {
            self.focused_monitor = Some(id);
            self.events.push(HostEvent::MonitorFocused(id));
        }
    }

    fn damage_monitor(&mut self, id: MonitorId) { self.events.push(HostEvent::MonitorDamaged(id)); }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const WS: WorkspaceId = WorkspaceId::new(1);

    fn host() -> (HeadlessHost, MonitorId) {
        let mut host = HeadlessHost::new();
        let mon = host.add_monitor(Rect::from_xywh(0.0, 0.0, 100.0, 100.0), Insets::default());
        host.add_workspace(WS, mon);
        (host, mon)
    }

    #[test]
    fn destroyed_windows_are_invalid() {
        let (mut host, _) = host();
        let wid = host.add_window(WS);
        assert!(host.window_is_valid(wid));
        host.destroy_window(wid);
        assert!(!host.window_is_valid(wid));
        assert_eq!(host.window_workspace(wid), None);
        assert!(host.tileable_windows().is_empty());
    }

    #[test]
    fn tileable_windows_skip_floating_and_hidden() {
        let (mut host, _) = host();
        let a = host.add_window(WS);
        let b = host.add_window(WS);
        let c = host.add_window(WS);
        host.set_floating(b, true);
        host.set_hidden(c, true);
        assert_eq!(host.tileable_windows(), vec![a]);
    }

    #[test]
    fn special_workspace_monitor_follows_the_monitor_that_opened_it() {
        let (mut host, mon) = host();
        let special = WorkspaceId::new(-99);
        host.add_special_workspace(special);
        let wid = host.add_window(special);
        assert_eq!(host.window_monitor(wid), None);
        host.open_special_workspace(mon, special);
        assert_eq!(host.window_monitor(wid), Some(mon));
        assert!(host.workspace_is_special(special));
    }

    #[test]
    fn workspace_fullscreen_reports_mode() {
        let (mut host, _) = host();
        let _a = host.add_window(WS);
        let b = host.add_window(WS);
        assert_eq!(host.workspace_fullscreen(WS), None);
        host.set_fullscreen(b, FullscreenMode::Maximized);
        assert_eq!(host.workspace_fullscreen(WS), Some((b, FullscreenMode::Maximized)));
    }

    #[test]
    fn neighbors_come_from_geometry_unless_overridden() {
        let (mut host, _) = host();
        let a = host.add_window(WS);
        let b = host.add_window(WS);
        let c = host.add_window(WS);
        host.set_goal_geometry(a, Rect::from_xywh(0.0, 0.0, 50.0, 100.0));
        host.set_goal_geometry(b, Rect::from_xywh(50.0, 0.0, 50.0, 50.0));
        host.set_goal_geometry(c, Rect::from_xywh(50.0, 50.0, 50.0, 50.0));

        assert_eq!(host.window_in_direction(b, Direction::Down), Some(c));
        assert_eq!(host.window_in_direction(c, Direction::Left), Some(a));
        assert_eq!(host.window_in_direction(a, Direction::Left), None);

        host.set_neighbor(a, Direction::Left, c);
        assert_eq!(host.window_in_direction(a, Direction::Left), Some(c));
    }

    #[test]
    fn focusing_a_window_focuses_its_monitor() {
        let (mut host, _) = host();
        let other = host.add_monitor(Rect::from_xywh(100.0, 0.0, 100.0, 100.0), Insets::default());
        let ws2 = WorkspaceId::new(2);
        host.add_workspace(ws2, other);
        let wid = host.add_window(ws2);
        host.focus_window(wid);
        assert_eq!(host.focused_monitor(), Some(other));
        assert_eq!(host.focused_window(), Some(wid));
    }
}
