//! Turning an observed geometry change into a model update.
//!
//! The host only tells us a window's new rectangle.  [`apply_geometry_change`]
//! compares it to the bounds the window had after the last layout pass and
//! works out what the user did:
//!
//! | Observation                                   | Interpretation          |
//! |-----------------------------------------------|-------------------------|
//! | `left` moved, width unchanged (or first)      | drag of the whole group |
//! | first window's left edge moved with a resize  | outer-edge resize       |
//! | last window resized with `left` unchanged     | outer-edge resize       |
//! | any other width change                        | internal-edge resize    |
//!
//! An outer-edge resize grows or shrinks the container.  An internal-edge
//! resize moves weight between the two windows that share the edge and
//! leaves the container alone.

use crate::model::{Bounds, Container, ObservedWindow, WindowEntry};
use log::debug;

/// How a width change was classified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resize {
    /// The container's width changed by `delta` pixels.
    OuterEdge { delta: i32 },
    /// Weight moved between the resized window and the entry at `neighbor`.
    InternalEdge { neighbor: usize },
}

/// Summary of what [`apply_geometry_change`] did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reconciliation {
    /// Horizontal shift applied to the container.
    pub shifted_by: i32,
    pub resize: Option<Resize>,
}

/// Fold `observed` (the new geometry of `windows[index]`) into the container
/// and the entries' width fractions.
///
/// Bounds are left untouched; the caller re-runs
/// [`calculate_bounds`](crate::layout::calculate_bounds) afterwards.
pub fn apply_geometry_change(
    container: &mut Container,
    windows: &mut [WindowEntry],
    index: usize,
    observed: &ObservedWindow,
) -> Reconciliation {
    let mut outcome = Reconciliation::default();
    let previous = windows[index].bounds;

    // State is container-wide.
    let state = observed.state.normalize();
    if state != previous.state() {
        container.state = state;
    }

    let rect = match previous {
        Bounds::Placed { rect, .. } => rect,
        // A hidden entry has no geometry to compare against.
        Bounds::Minimized => return outcome,
    };

    if observed.height != rect.height {
        container.height = observed.height;
    }
    if observed.top != rect.top {
        container.top = observed.top;
    }

    let first = index == 0;
    let last = index + 1 == windows.len();
    let left_moved = observed.left != rect.left;
    let width_changed = observed.width != rect.width;

    if left_moved && (!width_changed || first) {
        outcome.shifted_by = observed.left.saturating_sub(rect.left);
        container.left = container.left.saturating_add(outcome.shifted_by);
    }

    if !width_changed {
        return outcome;
    }
    if rect.width <= 0 {
        debug!("window {} had no width, cannot rescale its fraction", windows[index].id);
        return outcome;
    }

    let before = windows[index].width_fraction;
    let after = before / rect.width as f64 * observed.width as f64;
    windows[index].width_fraction = after;

    if (first && left_moved) || (!left_moved && last) {
        let delta = observed.width.saturating_sub(rect.width);
        container.width = container.width.saturating_add(delta);
        outcome.resize = Some(Resize::OuterEdge { delta });
    } else {
        // The adjacent entry takes the weight even when it is hidden, in
        // which case the visible layout does not follow the drag.
        let neighbor = if left_moved { index - 1 } else { index + 1 };
        windows[neighbor].width_fraction += before - after;
        outcome.resize = Some(Resize::InternalEdge { neighbor });
    }
    outcome
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::calculate_bounds;
    use crate::model::{ObservedState, WindowId, WindowState, WindowType};

    const EPS: f64 = 1e-9;

    fn setup(count: u64, width: i32) -> (Container, Vec<WindowEntry>) {
        let container = Container {
            top: 0,
            left: 0,
            width,
            height: 800,
            state: WindowState::Normal,
        };
        let mut windows: Vec<WindowEntry> = (1..=count)
            .map(|i| WindowEntry {
                id: WindowId(i),
                name: None,
                width_fraction: 1.0,
                is_primary: i == 1,
                is_hidden: false,
                kind: WindowType::Popup,
                bounds: Bounds::Minimized,
            })
            .collect();
        calculate_bounds(&container, &mut windows);
        (container, windows)
    }

    /// The observation a host would report for `windows[index]` untouched.
    fn observe(windows: &[WindowEntry], index: usize) -> ObservedWindow {
        let rect = windows[index].bounds.rect().unwrap();
        ObservedWindow {
            id: windows[index].id,
            top: rect.top,
            left: rect.left,
            width: rect.width,
            height: rect.height,
            state: ObservedState::Normal,
        }
    }

    fn fractions(windows: &[WindowEntry]) -> Vec<f64> {
        windows.iter().map(|w| w.width_fraction).collect()
    }

    fn sum(windows: &[WindowEntry]) -> f64 {
        windows.iter().map(|w| w.width_fraction).sum()
    }

    #[test]
    fn unchanged_observation_is_noop() {
        let (mut c, mut ws) = setup(2, 1000);
        let before = (c, fractions(&ws));
        let obs = observe(&ws, 1);
        let outcome = apply_geometry_change(&mut c, &mut ws, 1, &obs);
        assert_eq!(outcome, Reconciliation::default());
        assert_eq!((c, fractions(&ws)), before);
    }

    #[test]
    fn dragging_first_window_moves_whole_group() {
        let (mut c, mut ws) = setup(3, 900);
        let mut obs = observe(&ws, 0);
        obs.left += 120;
        obs.top += 30;
        let outcome = apply_geometry_change(&mut c, &mut ws, 0, &obs);
        assert_eq!(outcome.shifted_by, 120);
        assert_eq!(outcome.resize, None);
        assert_eq!((c.left, c.top, c.width), (120, 30, 900));
        assert_eq!(fractions(&ws), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn dragging_middle_window_moves_whole_group() {
        let (mut c, mut ws) = setup(3, 900);
        let mut obs = observe(&ws, 1);
        obs.left -= 50;
        apply_geometry_change(&mut c, &mut ws, 1, &obs);
        assert_eq!(c.left, -50);
        assert_eq!(c.width, 900);
    }

    #[test]
    fn height_change_propagates_to_container() {
        let (mut c, mut ws) = setup(2, 1000);
        let mut obs = observe(&ws, 1);
        obs.height = 640;
        apply_geometry_change(&mut c, &mut ws, 1, &obs);
        assert_eq!(c.height, 640);
        assert_eq!(c.width, 1000);
    }

    #[test]
    fn minimizing_any_window_minimizes_container() {
        let (mut c, mut ws) = setup(2, 1000);
        let mut obs = observe(&ws, 1);
        obs.state = ObservedState::Minimized;
        apply_geometry_change(&mut c, &mut ws, 1, &obs);
        assert_eq!(c.state, WindowState::Minimized);
    }

    #[test]
    fn maximized_is_treated_as_normal() {
        let (mut c, mut ws) = setup(2, 1000);
        c.state = WindowState::Minimized;
        calculate_bounds(&c, &mut ws);
        let mut obs = observe(&ws, 0);
        obs.state = ObservedState::Maximized;
        apply_geometry_change(&mut c, &mut ws, 0, &obs);
        assert_eq!(c.state, WindowState::Normal);
    }

    #[test]
    fn first_window_left_edge_resize_grows_container() {
        let (mut c, mut ws) = setup(2, 1000);
        let mut obs = observe(&ws, 0);
        obs.left -= 100;
        obs.width += 100;
        let outcome = apply_geometry_change(&mut c, &mut ws, 0, &obs);
        assert_eq!(outcome.resize, Some(Resize::OuterEdge { delta: 100 }));
        assert_eq!(c.left, -100);
        assert_eq!(c.width, 1100);
        assert!((ws[0].width_fraction - 1.2).abs() < EPS);
        assert_eq!(ws[1].width_fraction, 1.0, "other windows keep their fraction");

        calculate_bounds(&c, &mut ws);
        assert_eq!(ws[0].bounds.rect().unwrap().width, 600);
        assert_eq!(ws[1].bounds.rect().unwrap().width, 500);
    }

    #[test]
    fn last_window_right_edge_resize_shrinks_container() {
        let (mut c, mut ws) = setup(2, 1000);
        let mut obs = observe(&ws, 1);
        obs.width -= 50;
        let outcome = apply_geometry_change(&mut c, &mut ws, 1, &obs);
        assert_eq!(outcome.resize, Some(Resize::OuterEdge { delta: -50 }));
        assert_eq!(c.width, 950);
        assert_eq!(c.left, 0);
        assert_eq!(ws[0].width_fraction, 1.0);
        assert!((ws[1].width_fraction - 0.9).abs() < EPS);
    }

    #[test]
    fn right_edge_of_first_window_transfers_to_right_neighbor() {
        let (mut c, mut ws) = setup(2, 1000);
        let total = sum(&ws);
        let mut obs = observe(&ws, 0);
        obs.width = 600;
        let outcome = apply_geometry_change(&mut c, &mut ws, 0, &obs);
        assert_eq!(outcome.resize, Some(Resize::InternalEdge { neighbor: 1 }));
        assert_eq!(c.width, 1000);
        assert!((sum(&ws) - total).abs() < EPS);
        assert!((ws[1].width_fraction - 0.8).abs() < EPS);

        calculate_bounds(&c, &mut ws);
        assert_eq!(ws[0].bounds.rect().unwrap().width, 600);
        assert_eq!(ws[1].bounds.rect().unwrap().width, 400);
        assert_eq!(ws[1].bounds.rect().unwrap().left, 600);
    }

    #[test]
    fn left_edge_of_last_window_transfers_to_left_neighbor() {
        let (mut c, mut ws) = setup(2, 1000);
        let total = sum(&ws);
        let mut obs = observe(&ws, 1);
        obs.left += 50;
        obs.width -= 50;
        let outcome = apply_geometry_change(&mut c, &mut ws, 1, &obs);
        assert_eq!(outcome.shifted_by, 0, "resize from the left is not a drag");
        assert_eq!(outcome.resize, Some(Resize::InternalEdge { neighbor: 0 }));
        assert_eq!((c.left, c.width), (0, 1000));
        assert!((sum(&ws) - total).abs() < EPS);
        assert!((ws[0].width_fraction - 1.1).abs() < EPS);
    }

    #[test]
    fn middle_window_edges_pick_the_sharing_neighbor() {
        let (mut c, mut ws) = setup(3, 900);
        let mut obs = observe(&ws, 1);
        obs.width += 60;
        let outcome = apply_geometry_change(&mut c, &mut ws, 1, &obs);
        assert_eq!(outcome.resize, Some(Resize::InternalEdge { neighbor: 2 }));
        assert_eq!(ws[0].width_fraction, 1.0);

        let (mut c, mut ws) = setup(3, 900);
        let mut obs = observe(&ws, 1);
        obs.left -= 60;
        obs.width += 60;
        let outcome = apply_geometry_change(&mut c, &mut ws, 1, &obs);
        assert_eq!(outcome.resize, Some(Resize::InternalEdge { neighbor: 0 }));
        assert_eq!(ws[2].width_fraction, 1.0);
        assert_eq!(c.left, 0);
    }

    #[test]
    fn internal_resizes_preserve_total_weight() {
        let (mut c, mut ws) = setup(4, 2000);
        let total = sum(&ws);
        for (index, dl, dw) in [(1, 0, 37), (2, -13, 13), (0, 0, -21), (3, 44, -44), (2, 0, 5)] {
            let mut obs = observe(&ws, index);
            obs.left += dl;
            obs.width += dw;
            apply_geometry_change(&mut c, &mut ws, index, &obs);
            calculate_bounds(&c, &mut ws);
        }
        assert_eq!(c.width, 2000);
        assert!((sum(&ws) - total).abs() < EPS);
    }

    #[test]
    fn hidden_entry_only_carries_state() {
        let (mut c, mut ws) = setup(2, 1000);
        ws[1].is_hidden = true;
        calculate_bounds(&c, &mut ws);
        let obs = ObservedWindow {
            id: ws[1].id,
            top: 5,
            left: 77,
            width: 300,
            height: 300,
            state: ObservedState::Normal,
        };
        let outcome = apply_geometry_change(&mut c, &mut ws, 1, &obs);
        assert_eq!(outcome, Reconciliation::default());
        assert_eq!(c.state, WindowState::Normal);
        assert_eq!((c.top, c.left, c.width, c.height), (0, 0, 1000, 800));
    }

    #[test]
    fn zero_width_bounds_do_not_produce_infinite_fractions() {
        let (mut c, mut ws) = setup(2, 1000);
        ws[1].bounds = Bounds::Placed {
            rect: crate::model::Rect { top: 0, left: 1000, width: 0, height: 800 },
            state: WindowState::Normal,
        };
        let mut obs = observe(&ws, 1);
        obs.width = 200;
        apply_geometry_change(&mut c, &mut ws, 1, &obs);
        assert!(ws.iter().all(|w| w.width_fraction.is_finite()));
    }

    #[test]
    fn extreme_coordinates_saturate() {
        let (mut c, mut ws) = setup(3, 900);
        let mut obs = observe(&ws, 1);
        obs.left = i32::MIN;
        let outcome = apply_geometry_change(&mut c, &mut ws, 1, &obs);
        assert_eq!(outcome.shifted_by, i32::MIN);
        assert_eq!(c.left, i32::MIN);

        let (mut c, mut ws) = setup(3, 900);
        let mut obs = observe(&ws, 2);
        obs.width = i32::MAX;
        let outcome = apply_geometry_change(&mut c, &mut ws, 2, &obs);
        assert_eq!(outcome.resize, Some(Resize::OuterEdge { delta: i32::MAX - 300 }));
        assert_eq!(c.width, i32::MAX);
    }

    #[test]
    fn internal_resize_next_to_hidden_entry_feeds_the_hidden_one() {
        let (mut c, mut ws) = setup(3, 900);
        ws[2].is_hidden = true;
        calculate_bounds(&c, &mut ws);
        let mut obs = observe(&ws, 1);
        assert_eq!(obs.width, 450);
        obs.width = 510;
        let outcome = apply_geometry_change(&mut c, &mut ws, 1, &obs);
        assert_eq!(outcome.resize, Some(Resize::InternalEdge { neighbor: 2 }));
        assert_eq!(c.width, 900);
        assert!(ws[2].width_fraction < 1.0);

        calculate_bounds(&c, &mut ws);
        assert_ne!(ws[1].bounds.rect().unwrap().width, 510);
        assert!(ws[2].bounds.rect().is_none());
    }
}
