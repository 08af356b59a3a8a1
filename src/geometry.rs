//! Rectangles and the mapping between real and editor coordinates.
//!
//! The editor works in a reduced-scale, **y-up** space: a rectangle's origin
//! is its bottom-left corner and [`Rect::top`] is `y + height`.  Display
//! servers use a **y-down** space where a monitor's position is its top-left
//! corner.  [`real_to_editor`] and [`editor_to_real`] convert between the two.

use crate::screen::Screen;

/// An axis-aligned rectangle in editor space (y grows upward).
///
/// Values are `f64` so that rectangles can be dragged and animated by
/// fractional amounts; they are rounded only when a command is synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn top_left(&self) -> (f64, f64) {
        (self.left(), self.top())
    }

    pub fn top_right(&self) -> (f64, f64) {
        (self.right(), self.top())
    }

    pub fn bottom_left(&self) -> (f64, f64) {
        (self.left(), self.bottom())
    }

    pub fn bottom_right(&self) -> (f64, f64) {
        (self.right(), self.bottom())
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict interior test: points on the boundary are outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.left() < x && x < self.right() && self.bottom() < y && y < self.top()
    }

    /// Whether the interiors of `self` and `other` overlap.
    ///
    /// Rectangles that only share an edge or a corner do not collide.
    pub fn collide(&self, other: &Rect) -> bool {
        other.left() < self.right()
            && other.right() > self.left()
            && other.top() > self.bottom()
            && other.bottom() < self.top()
    }

    /// Return a copy with all four fields multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Rect {
        Rect::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Return a copy moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// The eight points used by the snap algorithm.
    ///
    /// Corners come first (top-left, top-right, bottom-right, bottom-left),
    /// followed by the top, bottom, left and right edge midpoints.  The order
    /// matters: ties in the snap search are won by the earlier point.
    pub fn reference_points(&self) -> [(f64, f64); 8] {
        let (cx, cy) = self.center();
        [
            self.top_left(),
            self.top_right(),
            self.bottom_right(),
            self.bottom_left(),
            (cx, self.top()),
            (cx, self.bottom()),
            (self.left(), cy),
            (self.right(), cy),
        ]
    }
}

/// Smallest rectangle containing every rectangle in `rects`.
///
/// Returns `None` for an empty iterator.
pub fn bounding_box<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
    let mut iter = rects.into_iter();
    let first = iter.next()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) =
        (first.left(), first.bottom(), first.right(), first.top());
    for r in iter {
        min_x = min_x.min(r.left());
        min_y = min_y.min(r.bottom());
        max_x = max_x.max(r.right());
        max_y = max_y.max(r.top());
    }
    Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Convert a screen's real position and effective size into an editor rect.
///
/// The effective size is the mode size divided by the screen scale, with
/// width and height swapped for rotated transforms.  Because editor y grows
/// upward, the rect's origin is the real **bottom**-left corner:
/// `(x / r, -(y / r) - h / r, w / r, h / r)`.
pub fn real_to_editor(screen: &Screen, ui_ratio: f64) -> Rect {
    let (x, y) = screen.position;
    let (w, h) = screen.effective_size();
    Rect::new(
        x as f64 / ui_ratio,
        -(y as f64 / ui_ratio) - h / ui_ratio,
        w / ui_ratio,
        h / ui_ratio,
    )
}

/// Inverse of [`real_to_editor`]: the real top-left position of `rect`.
pub fn editor_to_real(rect: &Rect, ui_ratio: f64) -> (i32, i32) {
    let x = rect.x * ui_ratio;
    let y = -rect.top() * ui_ratio;
    (x.round() as i32, y.round() as i32)
}
