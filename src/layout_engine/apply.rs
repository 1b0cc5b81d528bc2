//! Turns a node rectangle into the geometry a window is given.

use tracing::{error, trace};

use crate::common::config::{GapSettings, MiscSettings};
use crate::model::Placement;
use crate::sys::geometry::{Insets, Point, Rect, Round, Size, clamp_lenient, sticks};
use crate::sys::host::{Host, MonitorInfo, WorkspaceId};

/// Smallest size a tiled window is clamped to when it has no min size rule.
pub const MIN_WINDOW_SIZE: f64 = 20.0;

/// Settings the applier reads on every call.
#[derive(Clone, Copy, Debug)]
pub struct ApplyContext<'a> {
    pub gaps: &'a GapSettings,
    pub misc: &'a MiscSettings,
    /// Skip animations and jump straight to the new geometry.
    pub force_warps: bool,
}

/// Which edges of a rect touch the usable area of its monitor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StuckEdges {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl StuckEdges {
    pub fn of(rect: Rect, usable: Rect) -> StuckEdges {
        StuckEdges {
            left: sticks(rect.min().x, usable.min().x),
            right: sticks(rect.max().x, usable.max().x),
            top: sticks(rect.min().y, usable.min().y),
            bottom: sticks(rect.max().y, usable.max().y),
        }
    }

    /// Outer gaps on stuck edges, inner gaps everywhere else.
    pub fn gaps(&self, inner: Insets, outer: Insets) -> Insets {
        Insets {
            top: if self.top { outer.top } else { inner.top },
            right: if self.right { outer.right } else { inner.right },
            bottom: if self.bottom { outer.bottom } else { inner.bottom },
            left: if self.left { outer.left } else { inner.left },
        }
    }
}

/// The monitor showing a workspace. Special workspaces are found through the
/// monitor that has them open.
pub fn monitor_for_workspace<H: Host + ?Sized>(host: &H, workspace: WorkspaceId) -> Option<MonitorInfo> {
    if host.workspace_is_special(workspace) {
        host.monitors()
            .into_iter()
            .filter_map(|id| host.monitor(id))
            .find(|m| m.active_special_workspace == Some(workspace))
    } else {
        host.monitor(host.workspace_monitor(workspace)?)
    }
}

/// Places one window. Returns whether a goal geometry was committed.
pub fn apply_placement<H: Host + ?Sized>(
    host: &mut H,
    placement: Placement,
    workspace: WorkspaceId,
    cx: &ApplyContext<'_>,
) -> bool {
    let Some(monitor) = monitor_for_workspace(host, workspace) else {
        error!(?placement, %workspace, "Orphaned node: workspace has no monitor");
        return false;
    };
    let wid = placement.window;
    if !host.window_is_valid(wid) {
        error!(?placement, "Node holds a window that is no longer mapped");
        return false;
    }
    let is_fullscreen = host.window_is_fullscreen(wid);
    if is_fullscreen && !placement.ignore_fullscreen_checks {
        trace!(%wid, "Window is fullscreen, leaving it alone");
        return false;
    }

    let usable = monitor.usable_area();
    let stuck = StuckEdges::of(placement.rect, usable);
    let gaps = cx.gaps.effective_for_workspace(workspace);
    let outer: Insets = gaps.outer.into();
    let inner: Insets = gaps.inner.into();

    host.reset_layout_rules(wid);
    host.set_window_layout_geometry(wid, placement.rect);
    host.update_decorations(wid);

    let available = placement.rect.inset(stuck.gaps(inner, outer)).inset(host.window_reserved_area(wid));
    let mut target = available;

    if cx.misc.size_limits_tiled {
        let border = host.window_border_size(wid);
        let limits = host.window_size_limits(wid);
        let monitor_available = Size::new(
            usable.size.width - outer.horizontal() - 2.0 * border,
            usable.size.height - outer.vertical() - 2.0 * border,
        );
        let zero = Size::splat(0.0);
        let min = limits.min.unwrap_or(Size::splat(MIN_WINDOW_SIZE)).clamp(zero, monitor_available);
        let max = if is_fullscreen {
            Size::splat(f64::INFINITY)
        } else {
            limits.max.unwrap_or(Size::splat(f64::INFINITY)).clamp(zero, monitor_available)
        };
        let size = available.size.clamp(min, max);

        let centered = Point::new(
            available.origin.x + (available.size.width - size.width) / 2.0,
            available.origin.y + (available.size.height - size.height) / 2.0,
        );
        let origin = Point::new(
            clamp_lenient(
                centered.x,
                usable.min().x + outer.left + border,
                usable.max().x - outer.right - size.width - border,
            ),
            clamp_lenient(
                centered.y,
                usable.min().y + outer.top + border,
                usable.max().y - outer.bottom - size.height - border,
            ),
        );
        target = Rect::new(origin, size);
    }

    let target = target.round();
    trace!(%wid, ?target, "Committing window geometry");
    host.set_window_goal_geometry(wid, target);

    if cx.force_warps && !cx.misc.animate_manual_resizes {
        host.damage_window(wid);
        host.warp_window(wid);
        host.damage_window(wid);
    }

    host.update_decorations(wid);
    true
}
