//! Proportional bounds calculation.
//!
//! [`calculate_bounds`] is a pure function of the container and the ordered
//! entries.  It is always re-run in full after a mutation; nothing patches
//! individual bounds incrementally.

use crate::model::{Bounds, Container, Rect, WindowEntry};

/// Sum of `width_fraction` over visible entries.
pub fn total_weight(windows: &[WindowEntry]) -> f64 {
    windows
        .iter()
        .filter(|w| !w.is_hidden)
        .map(|w| w.width_fraction)
        .sum()
}

/// Lay the visible entries out left to right inside `container`.
///
/// Each visible entry gets `round(container.width * fraction / total)`
/// pixels, raised to its type's minimum width and then capped at whatever
/// width is still unassigned.  Hidden entries get [`Bounds::Minimized`] and
/// consume no space.
pub fn calculate_bounds(container: &Container, windows: &mut [WindowEntry]) {
    let total = total_weight(windows);
    let mut left = container.left;
    let mut available = container.width;

    for window in windows.iter_mut() {
        if window.is_hidden {
            window.bounds = Bounds::Minimized;
            continue;
        }
        let proposed = (container.width as f64 * window.width_fraction / total).round() as i32;
        let width = proposed.max(window.kind.minimum_width()).min(available);
        window.bounds = Bounds::Placed {
            rect: Rect {
                top: container.top,
                left,
                width,
                height: container.height,
            },
            state: container.state,
        };
        left += width;
        available -= width;
    }
}

//  Tests
