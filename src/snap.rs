//! Overlap resolution for a just-released screen.
//!
//! When the user drops a screen on top of another one, the dropped screen is
//! moved so that its closest reference point (a corner or an edge midpoint)
//! lands exactly on the nearest reference point of the screen it overlaps.
//!
//! Resolution is a single pass: only the first overlapping screen found is
//! taken into account.  If the corrected position still overlaps a third
//! screen, that overlap is left for the user to fix by dragging again.

use crate::geometry::Rect;

/// Squared Euclidean distance.  Ordering is identical to the true distance.
fn distance_sq(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}

/// Offset that moves `active` so its nearest reference point coincides with
/// the nearest reference point of `other`.
///
/// All 64 pairs are compared; on an exact tie the first pair found wins
/// (active points in the outer loop, `other` points in the inner loop).
pub fn closest_alignment(other: &Rect, active: &Rect) -> (f64, f64) {
    let other_points = other.reference_points();
    let mut best: Option<(f64, (f64, f64))> = None;
    for p_active in active.reference_points() {
        for p_other in other_points {
            let d = distance_sq(p_active, p_other);
            if best.map_or(true, |(min, _)| d < min) {
                best = Some((d, (p_other.0 - p_active.0, p_other.1 - p_active.1)));
            }
        }
    }
    best.map(|(_, offset)| offset).unwrap_or((0.0, 0.0))
}

/// Compute the snap for the last rectangle of `rects` (the one that was just
/// dragged and brought to the front).
///
/// The other rectangles are tested front to back, i.e. from the one selected
/// most recently to the oldest.  Returns the index of the overlapped
/// rectangle and the offset to apply to the active one, or `None` if the
/// active rectangle overlaps nothing.
pub fn resolve_overlap(rects: &[Rect]) -> Option<(usize, (f64, f64))> {
    let (active, others) = rects.split_last()?;
    others
        .iter()
        .enumerate()
        .rev()
        .find(|(_, r)| r.collide(active))
        .map(|(i, r)| (i, closest_alignment(r, active)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_unit_overlap_abuts_right_edge() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(9.0, 0.0, 10.0, 10.0);
        let (idx, (dx, dy)) = resolve_overlap(&[a, b]).unwrap();
        assert_eq!(idx, 0);
        let snapped = b.translated(dx, dy);
        assert_eq!(snapped.x, 10.0);
        assert_eq!(snapped.y, 0.0);
        assert!(!snapped.collide(&a));
    }

    #[test]
    fn no_overlap_means_no_snap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(resolve_overlap(&[a, b]).is_none());
        assert!(resolve_overlap(&[a]).is_none());
        assert!(resolve_overlap(&[]).is_none());
    }

    #[test]
    fn snaps_below_when_overlapping_from_underneath() {
        // Editor space is y-up: b sits slightly below a, overlapping by 2.
        let a = Rect::new(0.0, 0.0, 240.0, 135.0);
        let b = Rect::new(3.0, -133.0, 240.0, 135.0);
        let (_, (dx, dy)) = resolve_overlap(&[a, b]).unwrap();
        let snapped = b.translated(dx, dy);
        assert_eq!(snapped, Rect::new(0.0, -135.0, 240.0, 135.0));
    }

    #[test]
    fn midpoints_allow_centered_alignment() {
        // A small screen dropped near the middle of a large screen's top edge
        // aligns its bottom midpoint to the large screen's top midpoint.
        let big = Rect::new(0.0, 0.0, 100.0, 50.0);
        let small = Rect::new(31.0, 48.0, 40.0, 20.0);
        let (_, (dx, dy)) = resolve_overlap(&[big, small]).unwrap();
        let snapped = small.translated(dx, dy);
        assert_eq!(snapped, Rect::new(30.0, 50.0, 40.0, 20.0));
    }

    #[test]
    fn ties_prefer_first_enumerated_pair() {
        // Identical rects: every point coincides with its counterpart at
        // distance zero, the first pair (top-left/top-left) wins.
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(closest_alignment(&a, &a), (0.0, 0.0));
    }

    #[test]
    fn most_recent_offender_is_resolved_first() {
        let older = Rect::new(0.0, 0.0, 10.0, 10.0);
        let newer = Rect::new(20.0, 0.0, 10.0, 10.0);
        // Active overlaps both: 1 unit into `older` and 1 unit into `newer`.
        let active = Rect::new(9.0, 0.0, 12.0, 10.0);
        let (idx, _) = resolve_overlap(&[older, newer, active]).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn single_pass_may_leave_residual_overlap() {
        let left = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.5, 0.0, 10.0, 10.0);
        let active = Rect::new(9.0, 0.0, 10.0, 10.0);
        let (idx, (dx, dy)) = resolve_overlap(&[right, left, active]).unwrap();
        assert_eq!(idx, 1);
        let snapped = active.translated(dx, dy);
        assert!(!snapped.collide(&left));
        assert!(snapped.collide(&right));
    }
}
