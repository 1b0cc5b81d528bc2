//! Stack geometry.
//!
//! The main stack splits its share of the usable width horizontally, starting
//! next to the secondary stack and growing away from it. The secondary stack
//! takes the rest of the width and splits it vertically from the bottom up.

use tracing::warn;

use super::workspaces::{MainSide, WorkspaceConfig};
use crate::model::Node;
use crate::sys::geometry::{Rect, Size};

/// Weights used for the main stack. With overrides enabled, the first nodes
/// take the override values in order and any further node counts as 1.
pub fn effective_main_weights(main: &[Node], overrides: Option<&[f64]>) -> Vec<f64> {
    match overrides {
        None => main.iter().map(|n| n.weight).collect(),
        Some(overrides) => (0..main.len()).map(|i| overrides.get(i).copied().unwrap_or(1.0)).collect(),
    }
}

/// Divides `extent` in proportion to `weights`. Each share is capped at what
/// is left of the extent, so rounding never overshoots on the last node.
///
/// Returns `None` when the weights do not add up to a positive finite total.
pub fn split_extent(extent: f64, weights: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = weights.iter().sum();
    if !(total > 0.0 && total.is_finite()) {
        return None;
    }
    let mut remaining = extent;
    Some(
        weights
            .iter()
            .map(|weight| {
                let share = (extent * weight / total).min(remaining);
                remaining -= share;
                share
            })
            .collect(),
    )
}

/// Width of the main stack for the given usable width.
pub fn main_split_width(usable_width: f64, secondary_empty: bool, config: &WorkspaceConfig) -> f64 {
    if secondary_empty {
        usable_width
    } else {
        usable_width * config.main_stack_percent
    }
}

/// Which stacks received fresh rectangles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LaidOut {
    pub main: bool,
    pub secondary: bool,
}

/// Writes a rectangle into every node of both stacks. Nothing is laid out
/// while the main stack is empty.
pub fn layout_stacks(
    main: &mut [Node],
    secondary: &mut [Node],
    config: &WorkspaceConfig,
    usable: Rect,
) -> LaidOut {
    let mut laid_out = LaidOut::default();
    if main.is_empty() {
        return laid_out;
    }

    let Size { width, height } = usable.size;
    let origin = usable.origin;
    let split = main_split_width(width, secondary.is_empty(), config);
    let is_right = config.main_side == MainSide::Right;

    let weights = effective_main_weights(main, config.override_weights.as_deref());
    match split_extent(split, &weights) {
        Some(widths) => {
            // Innermost node first, next to the secondary stack.
            let mut next_x = if is_right { width - split } else { split };
            for (node, node_width) in main.iter_mut().zip(widths) {
                if !is_right {
                    next_x -= node_width;
                }
                node.rect = Rect::from_xywh(origin.x + next_x, origin.y, node_width, height);
                if is_right {
                    next_x += node_width;
                }
            }
            laid_out.main = true;
        }
        None => warn!(?weights, "Main stack weights do not sum to a positive total, skipping"),
    }

    if secondary.is_empty() {
        return laid_out;
    }

    let weights: Vec<f64> = secondary.iter().map(|n| n.weight).collect();
    let Some(heights) = split_extent(height, &weights) else {
        warn!(?weights, "Secondary stack weights do not sum to a positive total, skipping");
        return laid_out;
    };
    let x = if is_right { 0.0 } else { split };
    let secondary_width = width - split;
    let mut next_y = height;
    for (node, node_height) in secondary.iter_mut().zip(heights) {
        next_y -= node_height;
        node.rect = Rect::from_xywh(origin.x + x, origin.y + next_y, secondary_width, node_height);
    }
    laid_out.secondary = true;
    laid_out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::geometry::SameAs;
    use crate::sys::host::WindowId;

    fn nodes(weights: &[f64]) -> Vec<Node> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &weight)| {
                let mut node = Node::new(WindowId::new(i as u64 + 1));
                node.weight = weight;
                node
            })
            .collect()
    }

    fn config(side: MainSide, percent: f64) -> WorkspaceConfig {
        WorkspaceConfig {
            main_side: side,
            main_stack_percent: percent,
            ..Default::default()
        }
    }

    fn rects(nodes: &[Node]) -> Vec<Rect> { nodes.iter().map(|n| n.rect).collect() }

    const SCREEN: Rect = Rect::from_xywh(0.0, 0.0, 1920.0, 1080.0);

    mod weights {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn without_overrides_node_weights_are_used() {
            assert_eq!(effective_main_weights(&nodes(&[1.0, 2.5]), None), vec![1.0, 2.5]);
        }

        #[test]
        fn short_override_list_pads_with_one() {
            let main = nodes(&[5.0, 5.0, 5.0]);
            let weights = effective_main_weights(&main, Some(&[2.0, 1.0]));
            assert_eq!(weights, vec![2.0, 1.0, 1.0]);
            assert_eq!(weights.iter().sum::<f64>(), 4.0);
        }

        #[test]
        fn long_override_list_is_truncated() {
            let main = nodes(&[1.0]);
            assert_eq!(effective_main_weights(&main, Some(&[3.0, 4.0])), vec![3.0]);
        }

        #[test]
        fn empty_override_list_is_uniform() {
            assert_eq!(effective_main_weights(&nodes(&[4.0, 2.0]), Some(&[])), vec![1.0, 1.0]);
        }
    }

    mod split {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn shares_sum_to_extent() {
            let weights = [1.0, 2.0, 3.0, 0.7];
            let shares = split_extent(1000.0, &weights).unwrap();
            let total: f64 = weights.iter().sum();
            assert!((shares.iter().sum::<f64>() - 1000.0).abs() < 1e-9);
            for (share, weight) in shares.iter().zip(weights) {
                assert!(*share <= 1000.0 * weight / total);
            }
        }

        #[test]
        fn zero_total_is_rejected() {
            assert_eq!(split_extent(100.0, &[0.0, 0.0]), None);
            assert_eq!(split_extent(100.0, &[1.0, -1.0]), None);
            assert_eq!(split_extent(100.0, &[]), None);
        }

        #[test]
        fn zero_weight_gets_zero_width() {
            assert_eq!(split_extent(100.0, &[0.0, 1.0]), Some(vec![0.0, 100.0]));
        }
    }

    mod layout {
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn empty_main_stack_lays_out_nothing() {
            let mut secondary = nodes(&[1.0]);
            let laid_out = layout_stacks(&mut [], &mut secondary, &config(MainSide::Left, 0.5), SCREEN);
            assert_eq!(laid_out, LaidOut::default());
            assert_eq!(secondary[0].rect, Rect::default());
        }

        #[test]
        fn single_window_fills_usable_area() {
            let mut main = nodes(&[1.0]);
            let usable = Rect::from_xywh(0.0, 30.0, 1920.0, 1050.0);
            layout_stacks(&mut main, &mut [], &config(MainSide::Left, 0.5), usable);
            assert_eq!(main[0].rect, usable);
        }

        #[test]
        fn weighted_main_stack_on_the_left_grows_leftwards() {
            let mut main = nodes(&[1.0, 3.0]);
            let usable = Rect::from_xywh(0.0, 0.0, 1000.0, 500.0);
            layout_stacks(&mut main, &mut [], &config(MainSide::Left, 0.5), usable);
            assert_eq!(
                rects(&main),
                vec![Rect::from_xywh(750.0, 0.0, 250.0, 500.0), Rect::from_xywh(0.0, 0.0, 750.0, 500.0)]
            );
        }

        #[test]
        fn weighted_main_stack_on_the_right_grows_rightwards() {
            let mut main = nodes(&[1.0, 3.0]);
            let usable = Rect::from_xywh(0.0, 0.0, 1000.0, 500.0);
            layout_stacks(&mut main, &mut [], &config(MainSide::Right, 0.5), usable);
            assert_eq!(
                rects(&main),
                vec![Rect::from_xywh(0.0, 0.0, 250.0, 500.0), Rect::from_xywh(250.0, 0.0, 750.0, 500.0)]
            );
        }

        #[test]
        fn secondary_stack_fills_from_the_bottom() {
            let mut main = nodes(&[1.0]);
            let mut secondary = nodes(&[1.0, 1.0]);
            layout_stacks(&mut main, &mut secondary, &config(MainSide::Left, 0.5), SCREEN);
            assert_eq!(main[0].rect, Rect::from_xywh(0.0, 0.0, 960.0, 1080.0));
            assert_eq!(
                rects(&secondary),
                vec![
                    Rect::from_xywh(960.0, 540.0, 960.0, 540.0),
                    Rect::from_xywh(960.0, 0.0, 960.0, 540.0),
                ]
            );
        }

        #[test]
        fn right_main_side_puts_secondary_on_the_left() {
            let mut main = nodes(&[1.0]);
            let mut secondary = nodes(&[1.0]);
            layout_stacks(&mut main, &mut secondary, &config(MainSide::Right, 0.6), SCREEN);
            assert!(main[0].rect.same_as(Rect::from_xywh(768.0, 0.0, 1152.0, 1080.0)));
            assert!(secondary[0].rect.same_as(Rect::from_xywh(0.0, 0.0, 768.0, 1080.0)));
        }

        #[test]
        fn positions_are_offset_by_usable_origin() {
            let mut main = nodes(&[1.0]);
            let mut secondary = nodes(&[1.0]);
            let usable = Rect::from_xywh(1920.0, 40.0, 1000.0, 1000.0);
            layout_stacks(&mut main, &mut secondary, &config(MainSide::Left, 0.5), usable);
            assert_eq!(main[0].rect, Rect::from_xywh(1920.0, 40.0, 500.0, 1000.0));
            assert_eq!(secondary[0].rect, Rect::from_xywh(2420.0, 40.0, 500.0, 1000.0));
        }

        #[test]
        fn overrides_do_not_touch_secondary_stack() {
            let mut main = nodes(&[1.0, 1.0]);
            let mut secondary = nodes(&[1.0, 3.0]);
            let mut cfg = config(MainSide::Left, 0.5);
            cfg.override_weights = Some(vec![3.0]);
            let usable = Rect::from_xywh(0.0, 0.0, 800.0, 400.0);
            layout_stacks(&mut main, &mut secondary, &cfg, usable);
            assert_eq!(main[0].rect.size.width, 300.0);
            assert_eq!(main[1].rect.size.width, 100.0);
            assert_eq!(secondary[0].rect.size.height, 100.0);
            assert_eq!(secondary[1].rect.size.height, 300.0);
        }

        #[test]
        fn degenerate_main_weights_leave_main_rects_alone() {
            let mut main = nodes(&[0.0]);
            let mut secondary = nodes(&[1.0]);
            let laid_out = layout_stacks(&mut main, &mut secondary, &config(MainSide::Left, 0.5), SCREEN);
            assert_eq!(laid_out, LaidOut { main: false, secondary: true });
            assert_eq!(main[0].rect, Rect::default());
            assert_eq!(secondary[0].rect, Rect::from_xywh(960.0, 0.0, 960.0, 1080.0));
        }

        #[test]
        fn layout_is_idempotent() {
            let mut main = nodes(&[1.0, 0.3, 2.0]);
            let mut secondary = nodes(&[0.5, 1.5, 1.0]);
            let cfg = config(MainSide::Right, 0.37);
            layout_stacks(&mut main, &mut secondary, &cfg, SCREEN);
            let first = (rects(&main), rects(&secondary));
            layout_stacks(&mut main, &mut secondary, &cfg, SCREEN);
            assert_eq!((rects(&main), rects(&secondary)), first);
        }
    }
}
