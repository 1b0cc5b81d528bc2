use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::apply::{ApplyContext, apply_placement, monitor_for_workspace};
use super::calculate::layout_stacks;
use super::message::{WeightAdjustment, parse_message};
use super::workspaces::{WorkspaceConfig, WorkspaceConfigStore};
use super::Direction;
use crate::common::config::{GapSettings, MiscSettings, Settings};
use crate::model::{FakeNode, Node, Placement, StackRole, StackStore};
use crate::sys::geometry::Size;
use crate::sys::host::{FullscreenMode, Host, MonitorId, WindowId, WorkspaceId};

const LAYOUT_NAME: &str = "OrthoStack";

#[non_exhaustive]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LayoutCommand {
    AdjustWeight {
        adjustment: WeightAdjustment,
    },
    /// `None` when the weights could not be parsed; the layout is still
    /// recomputed.
    OverrideMainWeights {
        weights: Option<Vec<f64>>,
    },
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    /// A window became tiled.
    WindowCreated(WindowId),
    /// A window stopped being tiled, or went away.
    WindowRemoved(WindowId),
    /// The host changed a window's fullscreen mode from `current` to `target`.
    FullscreenRequested {
        wid: WindowId,
        current: FullscreenMode,
        target: FullscreenMode,
    },
    MoveWindow {
        wid: WindowId,
        direction: Direction,
        silent: bool,
    },
    SwapWindows(WindowId, WindowId),
    /// `to` takes over the position of `from`.
    WindowReplaced {
        from: WindowId,
        to: WindowId,
    },
    /// Geometry of a monitor or its reserved areas changed.
    MonitorChanged(MonitorId),
    WindowChanged(WindowId),
}

#[must_use]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventResponse {
    /// Monitors laid out again while handling the event, in order.
    pub recalculated_monitors: Vec<MonitorId>,
}

/// Main/secondary stack layout for every workspace.
#[derive(Debug)]
pub struct LayoutEngine {
    stacks: StackStore,
    workspace_configs: WorkspaceConfigStore,
    gaps: GapSettings,
    misc: MiscSettings,
    force_warps: bool,
    recalculated: Vec<MonitorId>,
}

impl LayoutEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            stacks: StackStore::new(),
            workspace_configs: WorkspaceConfigStore::new(Box::new(settings.layout.clone())),
            gaps: settings.gaps.clone(),
            misc: settings.misc.clone(),
            force_warps: false,
            recalculated: Vec::new(),
        }
    }

    /// Takes new settings. Gaps and misc settings apply from the next layout
    /// pass; workspaces already loaded keep their stack settings.
    pub fn set_settings(&mut self, settings: &Settings) {
        self.workspace_configs.set_provider(Box::new(settings.layout.clone()));
        self.gaps = settings.gaps.clone();
        self.misc = settings.misc.clone();
    }

    pub fn set_force_warps(&mut self, force_warps: bool) { self.force_warps = force_warps; }

    pub fn layout_name(&self) -> &'static str { LAYOUT_NAME }

    pub fn stacks(&self) -> &StackStore { &self.stacks }

    pub fn workspace_config(&self, workspace: WorkspaceId) -> Option<&WorkspaceConfig> {
        self.workspace_configs.peek(workspace)
    }

    /// Tiles every window the host reports as tileable.
    pub fn enable(&mut self, host: &mut impl Host) -> EventResponse {
        self.recalculated.clear();
        for wid in host.tileable_windows() {
            self.window_created(host, wid);
        }
        self.take_response()
    }

    /// Forgets all stacks and workspace settings. Windows are left as they are.
    pub fn disable(&mut self) {
        self.stacks.clear();
        self.workspace_configs.clear();
        self.recalculated.clear();
    }

    pub fn handle_event(&mut self, host: &mut impl Host, event: LayoutEvent) -> EventResponse {
        debug!(?event);
        self.recalculated.clear();
        match event {
            LayoutEvent::WindowCreated(wid) => self.window_created(host, wid),
            LayoutEvent::WindowRemoved(wid) => self.window_removed(host, wid),
            LayoutEvent::FullscreenRequested { wid, current, target } => {
                self.fullscreen_requested(host, wid, current, target)
            }
            LayoutEvent::MoveWindow { wid, direction, silent } => {
                self.move_window(host, wid, direction, silent)
            }
            LayoutEvent::SwapWindows(a, b) => self.swap_windows(host, a, b),
            LayoutEvent::WindowReplaced { from, to } => self.replace_window(host, from, to),
            LayoutEvent::MonitorChanged(monitor) => self.relayout_monitor(host, monitor),
            LayoutEvent::WindowChanged(wid) => self.relayout_window(host, wid),
        }
        self.take_response()
    }

    /// Runs a command against `target`, the window the host routed it to.
    pub fn handle_command(
        &mut self,
        host: &mut impl Host,
        target: Option<WindowId>,
        command: LayoutCommand,
    ) -> EventResponse {
        debug!(?command, ?target);
        self.recalculated.clear();
        match command {
            LayoutCommand::AdjustWeight { adjustment } => self.adjust_weight(host, target, adjustment),
            LayoutCommand::OverrideMainWeights { weights } => {
                self.override_main_weights(host, target, weights)
            }
        }
        self.take_response()
    }

    /// Parses and runs a runtime message. Bad messages are logged and ignored.
    pub fn handle_message(
        &mut self,
        host: &mut impl Host,
        target: Option<WindowId>,
        message: &str,
    ) -> EventResponse {
        match parse_message(message) {
            Ok(Some(command)) => self.handle_command(host, target, command),
            Ok(None) => {
                debug!(msg = message, "Ignoring unknown layout message");
                EventResponse::default()
            }
            Err(e) => {
                error!("Bad layout message {message:?}: {e}");
                EventResponse::default()
            }
        }
    }

    pub fn is_window_tiled(&self, wid: WindowId) -> bool { self.stacks.contains(wid) }

    pub fn is_window_in_main_stack(&self, wid: WindowId) -> bool {
        self.stacks.find(wid).is_some_and(|loc| loc.role == StackRole::Main)
    }

    /// Window to focus after `wid`: the next one in its stack, then the head
    /// of the other stack, wrapping to the head of its own stack.
    pub fn next_window_candidate(&self, host: &impl Host, wid: WindowId) -> Option<WindowId> {
        let Some(loc) = self.stacks.find(wid) else {
            let monitor = host.monitor(host.focused_monitor()?)?;
            let workspace = monitor.active_workspace?;
            return self.stacks.stack(StackRole::Main, workspace).first().map(|n| n.window);
        };
        let own = self.stacks.stack(loc.role, loc.workspace);
        let other = self.stacks.stack(loc.role.other(), loc.workspace);
        own.get(loc.index + 1)
            .or_else(|| other.first())
            .or_else(|| own.first())
            .map(|n| n.window)
    }

    /// Size a window would get if it were created now on the focused monitor.
    pub fn predict_size_for_new_window(&mut self, host: &impl Host) -> Option<Size> {
        let monitor = host.monitor(host.focused_monitor()?)?;
        let workspace = monitor.active_workspace?;
        let size = monitor.frame.size;
        let main = self.stacks.stack(StackRole::Main, workspace);
        if main.is_empty() {
            return Some(size);
        }
        let main_weight: f64 = main.iter().map(|n| n.weight).sum();
        let main_len = main.len();
        let secondary_weight: f64 =
            self.stacks.stack(StackRole::Secondary, workspace).iter().map(|n| n.weight).sum();

        let config = self.workspace_configs.get(workspace);
        if main_len < config.main_stack_min {
            Some(Size::new(
                size.width * config.main_stack_percent / (1.0 + main_weight),
                size.height,
            ))
        } else {
            Some(Size::new(
                size.width * (1.0 - config.main_stack_percent),
                size.height / (1.0 + secondary_weight),
            ))
        }
    }

    /// Lays out the monitor's open special workspace, then its active one.
    pub fn recalculate_monitor(&mut self, host: &mut impl Host, monitor: MonitorId) -> EventResponse {
        self.recalculated.clear();
        self.relayout_monitor(host, monitor);
        self.take_response()
    }

    /// Recalculates the window's monitor if the window is tiled.
    pub fn recalculate_window(&mut self, host: &mut impl Host, wid: WindowId) -> EventResponse {
        self.recalculated.clear();
        self.relayout_window(host, wid);
        self.take_response()
    }

    pub fn draw_workspace(&self, workspace: WorkspaceId) -> String {
        let stack_tree = |role: StackRole| {
            let leaves = self
                .stacks
                .stack(role, workspace)
                .iter()
                .map(|n| ascii_tree::Tree::Leaf(vec![format!("{} weight={} {:?}", n.window, n.weight, n.rect)]))
                .collect();
            ascii_tree::Tree::Node(format!("{role:?}"), leaves)
        };
        let tree = ascii_tree::Tree::Node(
            format!("workspace {workspace}"),
            vec![stack_tree(StackRole::Main), stack_tree(StackRole::Secondary)],
        );
        let mut out = String::new();
        if ascii_tree::write_tree(&mut out, &tree).is_err() {
            out.clear();
        }
        out
    }

    pub fn debug_workspace(&self, workspace: WorkspaceId) {
        debug!("Stacks\n{}", self.draw_workspace(workspace).trim());
    }

    fn take_response(&mut self) -> EventResponse {
        EventResponse {
            recalculated_monitors: std::mem::take(&mut self.recalculated),
        }
    }

    fn apply_context(&self) -> ApplyContext<'_> {
        ApplyContext {
            gaps: &self.gaps,
            misc: &self.misc,
            force_warps: self.force_warps,
        }
    }

    fn apply(&self, host: &mut impl Host, placement: Placement, workspace: WorkspaceId) {
        apply_placement(host, placement, workspace, &self.apply_context());
    }

    fn relayout_monitor(&mut self, host: &mut impl Host, monitor: MonitorId) {
        let Some(info) = host.monitor(monitor) else {
            debug!(?monitor, "Not recalculating unknown monitor");
            return;
        };
        let Some(active) = info.active_workspace else {
            return;
        };
        host.damage_monitor(monitor);
        self.recalculated.push(monitor);

        if let Some(special) = info.active_special_workspace {
            self.calculate_workspace(host, special);
        }
        self.calculate_workspace(host, active);
    }

    fn relayout_window(&mut self, host: &mut impl Host, wid: WindowId) {
        if !self.stacks.contains(wid) {
            return;
        }
        if let Some(monitor) = host.window_monitor(wid) {
            self.relayout_monitor(host, monitor);
        }
    }

    fn recalculate_monitor_of(&mut self, host: &mut impl Host, wid: WindowId) {
        match host.window_monitor(wid) {
            Some(monitor) => self.relayout_monitor(host, monitor),
            None => warn!(%wid, "Window has no monitor, not recalculating"),
        }
    }

    fn window_created(&mut self, host: &mut impl Host, wid: WindowId) {
        if host.window_is_floating(wid) {
            return;
        }
        let Some(workspace) = host.window_workspace(wid) else {
            warn!(%wid, "Created window has no workspace");
            return;
        };

        let minimum = self.workspace_configs.get(workspace).main_stack_min;
        let role = if self.stacks.stack_len(StackRole::Main, workspace) < minimum {
            StackRole::Main
        } else {
            StackRole::Secondary
        };
        if !self.stacks.push(workspace, role, Node::new(wid)) {
            return;
        }
        debug!(%wid, %workspace, ?role, "Tiled window");

        self.recalculate_monitor_of(host, wid);
        host.workspace_windows_changed(workspace);
        self.debug_workspace(workspace);
    }

    fn window_removed(&mut self, host: &mut impl Host, wid: WindowId) {
        let Some((loc, _)) = self.stacks.remove(wid) else {
            return;
        };
        host.reset_layout_rules(wid);

        if host.window_is_fullscreen(wid) {
            host.set_fullscreen_mode(wid, FullscreenMode::None);
        }

        if loc.role == StackRole::Main {
            let minimum = self.workspace_configs.get(loc.workspace).main_stack_min;
            for promoted in self.stacks.fill_main_to(loc.workspace, minimum) {
                debug!(%promoted, workspace = %loc.workspace, "Promoted window to main stack");
            }
        }
        debug!(%wid, workspace = %loc.workspace, "Untiled window");

        // The window may already be gone; its workspace still has a monitor.
        let monitor = host.window_monitor(wid).or_else(|| host.workspace_monitor(loc.workspace));
        if let Some(monitor) = monitor {
            self.relayout_monitor(host, monitor);
        }
        host.workspace_windows_changed(loc.workspace);
        self.debug_workspace(loc.workspace);
    }

    fn calculate_workspace(&mut self, host: &mut impl Host, workspace: WorkspaceId) {
        let Some(monitor) = monitor_for_workspace(host, workspace) else {
            warn!(%workspace, "Workspace has no monitor");
            return;
        };

        if let Some((wid, mode)) = host.workspace_fullscreen(workspace) {
            match mode {
                FullscreenMode::Fullscreen => host.set_window_goal_geometry(wid, monitor.frame),
                FullscreenMode::Maximized => {
                    let fake = FakeNode::new(wid, monitor.usable_area());
                    host.set_window_layout_geometry(wid, fake.rect);
                    self.apply(host, fake.placement(), workspace);
                }
                FullscreenMode::None => {}
            }
            if mode != FullscreenMode::None {
                return;
            }
        }

        self.prune_orphans(&*host, workspace);

        let config = self.workspace_configs.get(workspace).clone();
        let (main, secondary) = self.stacks.stacks_mut(workspace);
        let laid_out = layout_stacks(main, secondary, &config, monitor.usable_area());

        let mut placements: Vec<Placement> = Vec::new();
        if laid_out.main {
            placements.extend(main.iter().map(Node::placement));
        }
        if laid_out.secondary {
            placements.extend(secondary.iter().map(Node::placement));
        }
        for placement in placements {
            self.apply(host, placement, workspace);
        }
    }

    /// Drops nodes whose window no longer exists, refilling the main stack.
    fn prune_orphans(&mut self, host: &impl Host, workspace: WorkspaceId) {
        let dropped = self.stacks.prune(workspace, |wid| host.window_is_valid(wid));
        if dropped.is_empty() {
            return;
        }
        warn!(?dropped, %workspace, "Dropped nodes of windows that no longer exist");
        let minimum = self.workspace_configs.get(workspace).main_stack_min;
        self.stacks.fill_main_to(workspace, minimum);
    }

    fn fullscreen_requested(
        &mut self,
        host: &mut impl Host,
        wid: WindowId,
        current: FullscreenMode,
        target: FullscreenMode,
    ) {
        if host.window_is_floating(wid) && current == FullscreenMode::None {
            if let Some(goal) = host.window_goal_geometry(wid) {
                host.save_floating_geometry(wid, goal);
            }
        }

        match target {
            FullscreenMode::None => match self.stacks.find(wid) {
                Some(loc) => {
                    if let Some(node) = self.stacks.node(wid) {
                        self.apply(host, node.placement(), loc.workspace);
                    }
                }
                None => {
                    if let Some(rect) = host.last_floating_geometry(wid) {
                        host.set_window_goal_geometry(wid, rect);
                    }
                    host.reset_layout_rules(wid);
                }
            },
            FullscreenMode::Fullscreen => {
                if let Some(monitor) = host.window_monitor(wid).and_then(|m| host.monitor(m)) {
                    host.set_window_goal_geometry(wid, monitor.frame);
                }
            }
            FullscreenMode::Maximized => {
                let monitor = host.window_monitor(wid).and_then(|m| host.monitor(m));
                match (monitor, host.window_workspace(wid)) {
                    (Some(monitor), Some(workspace)) => {
                        let fake = FakeNode::new(wid, monitor.usable_area());
                        host.set_window_layout_geometry(wid, fake.rect);
                        self.apply(host, fake.placement(), workspace);
                    }
                    _ => warn!(%wid, "Cannot maximize window without a monitor"),
                }
            }
        }

        host.raise_window(wid);
    }

    fn move_window(&mut self, host: &mut impl Host, wid: WindowId, direction: Direction, silent: bool) {
        let Some(neighbor) = host.window_in_direction(wid, direction) else {
            debug!(%wid, %direction, "No window in direction");
            return;
        };
        let (Some(workspace), Some(target)) =
            (host.window_workspace(wid), host.window_workspace(neighbor))
        else {
            return;
        };

        if workspace != target {
            self.window_removed(host, wid);
            host.move_window_to_workspace(wid, target);
            if !silent {
                if let Some(monitor) = host.window_monitor(wid) {
                    host.focus_monitor(monitor);
                }
            }
            self.window_created(host, wid);
        } else {
            self.swap_windows(host, wid, neighbor);
            if silent {
                host.focus_window(neighbor);
            }
        }
    }

    fn swap_windows(&mut self, host: &mut impl Host, a: WindowId, b: WindowId) {
        let Some((loc_a, loc_b)) = self.stacks.swap(a, b) else {
            debug!(%a, %b, "Not swapping: both windows must be tiled");
            return;
        };

        self.recalculate_monitor_of(host, a);
        if loc_a.workspace != loc_b.workspace {
            self.recalculate_monitor_of(host, b);
        }
        host.damage_window(a);
        host.damage_window(b);
    }

    fn replace_window(&mut self, host: &mut impl Host, from: WindowId, to: WindowId) {
        let Some(loc) = self.stacks.replace_window(from, to) else {
            return;
        };
        if let Some(node) = self.stacks.node(to) {
            self.apply(host, node.placement(), loc.workspace);
        }
    }

    fn adjust_weight(
        &mut self,
        host: &mut impl Host,
        target: Option<WindowId>,
        adjustment: WeightAdjustment,
    ) {
        let Some(wid) = target else {
            error!("adjustweight needs a target window");
            return;
        };
        let Some(node) = self.stacks.node_mut(wid) else {
            debug!(%wid, "adjustweight: window is not tiled");
            return;
        };
        node.weight = adjustment.apply(node.weight);
        debug!(%wid, weight = node.weight, "Adjusted weight");
        self.recalculate_monitor_of(host, wid);
    }

    fn override_main_weights(
        &mut self,
        host: &mut impl Host,
        target: Option<WindowId>,
        weights: Option<Vec<f64>>,
    ) {
        let Some(wid) = target else {
            error!("overridemainweights needs a target window");
            return;
        };
        let Some(workspace) = host.window_workspace(wid) else {
            error!(%wid, "overridemainweights: window has no workspace");
            return;
        };
        if let Some(weights) = weights {
            debug!(%workspace, ?weights, "Overriding main stack weights");
            self.workspace_configs.get(workspace).override_weights = Some(weights);
        }
        self.recalculate_monitor_of(host, wid);
    }
}
