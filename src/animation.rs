//! Per-frame interpolation of a rectangle toward its target.
//!
//! Each field moves halfway to its target per frame until it is within one
//! unit, at which point it snaps.  The motion is framerate dependent, which
//! is fine for a 15–60 fps editor.

use crate::geometry::Rect;

/// Distance under which a value snaps directly to its target.
pub const SNAP_DISTANCE: f64 = 1.0;

/// Advance `current` one frame toward `target`.
pub fn step_value(current: f64, target: f64) -> f64 {
    let delta = target - current;
    if delta.abs() <= SNAP_DISTANCE {
        return target;
    }
    let next = current + delta / 2.0;
    if delta > 0.0 {
        next.min(target)
    } else {
        next.max(target)
    }
}

/// Advance every field of `current` one frame toward `target`.
pub fn step_rect(current: &Rect, target: &Rect) -> Rect {
    Rect::new(
        step_value(current.x, target.x),
        step_value(current.y, target.y),
        step_value(current.width, target.width),
        step_value(current.height, target.height),
    )
}
