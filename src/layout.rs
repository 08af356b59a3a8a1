//! The editable arrangement of screens.
//!
//! A [`Layout`] is an ordered list of [`GuiScreen`]s, back to front: the last
//! entry is drawn on top and is the one being dragged.  All geometry lives in
//! editor space (see [`crate::geometry`]).

use crate::animation::step_rect;
use crate::geometry::{bounding_box, real_to_editor, Rect};
use crate::screen::Screen;
use crate::snap::resolve_overlap;
use log::debug;

/// An RGB colour.
pub type Color = (u8, u8, u8);

const PALETTE: [Color; 7] = [
    (172, 65, 66),
    (126, 141, 80),
    (229, 181, 102),
    (108, 153, 186),
    (158, 78, 133),
    (125, 213, 207),
    (208, 208, 208),
];

/// Hands out screen colours, first from a fixed palette and then from a
/// deterministic pseudo-random sequence in the `100..=200` range.
///
/// Each editor session owns its own sequence, so two sessions never share
/// colour state.
#[derive(Debug, Clone, Default)]
pub struct ColorSequence {
    next: usize,
}

impl ColorSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next colour in the sequence.
    pub fn next_color(&mut self) -> Color {
        let i = self.next;
        self.next += 1;
        if let Some(c) = PALETTE.get(i) {
            return *c;
        }
        // Knuth multiplicative hash, spread into three channels.
        let h = (i as u32).wrapping_mul(2_654_435_761);
        let channel = |shift: u32| 100 + ((h >> shift) % 101) as u8;
        (channel(0), channel(8), channel(16))
    }
}

/// A screen as shown in the editor.
#[derive(Debug, Clone)]
pub struct GuiScreen {
    pub screen: Screen,
    /// Where the screen is drawn this frame.
    pub rect: Rect,
    /// Where the screen is heading.  Equal to `rect` at rest.
    pub target_rect: Rect,
    pub color: Color,
}

impl GuiScreen {
    pub fn new(screen: Screen, rect: Rect, color: Color) -> Self {
        Self {
            screen,
            rect,
            target_rect: rect,
            color,
        }
    }

    /// Move both the displayed and the target rectangle to `(x, y)`.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.rect.x = x;
        self.rect.y = y;
        self.target_rect.x = x;
        self.target_rect.y = y;
    }

    /// Translate both rectangles by `(dx, dy)`.  A screen that is still
    /// animating keeps heading for its (translated) target.
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.rect = self.rect.translated(dx, dy);
        self.target_rect = self.target_rect.translated(dx, dy);
    }

    /// Whether the displayed rectangle has reached its target.
    pub fn at_rest(&self) -> bool {
        self.rect == self.target_rect
    }

    /// Resize the target rectangle to match the screen's current mode,
    /// scale and transform, keeping its position.
    pub fn refresh_size(&mut self, ui_ratio: f64) {
        let sized = real_to_editor(&self.screen, ui_ratio);
        self.target_rect.width = sized.width;
        self.target_rect.height = sized.height;
    }
}

/// Ordered collection of [`GuiScreen`]s, back to front.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    screens: Vec<GuiScreen>,
}

impl Layout {
    /// Build a layout from real screen data.
    ///
    /// Screens are ordered by uid and placed with [`real_to_editor`]; the
    /// caller is expected to center the result in its viewport.
    pub fn from_screens(mut screens: Vec<Screen>, ui_ratio: f64, colors: &mut ColorSequence) -> Self {
        screens.sort_by(|a, b| a.uid.cmp(&b.uid));
        let screens = screens
            .into_iter()
            .map(|s| {
                let rect = real_to_editor(&s, ui_ratio);
                GuiScreen::new(s, rect, colors.next_color())
            })
            .collect();
        Self { screens }
    }

    pub fn screens(&self) -> &[GuiScreen] {
        &self.screens
    }

    pub fn screens_mut(&mut self) -> &mut [GuiScreen] {
        &mut self.screens
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    pub fn get(&self, uid: &str) -> Option<&GuiScreen> {
        self.screens.iter().find(|s| s.screen.uid == uid)
    }

    pub fn get_mut(&mut self, uid: &str) -> Option<&mut GuiScreen> {
        self.screens.iter_mut().find(|s| s.screen.uid == uid)
    }

    /// The front-most screen (last in the list).
    pub fn front(&self) -> Option<&GuiScreen> {
        self.screens.last()
    }

    /// The uid of the front-most screen whose displayed rectangle contains
    /// `(x, y)`.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&str> {
        self.screens
            .iter()
            .rev()
            .find(|s| s.rect.contains(x, y))
            .map(|s| s.screen.uid.as_str())
    }

    /// Move the screen with `uid` to the front.  Returns `false` if no such
    /// screen exists.
    pub fn bring_to_front(&mut self, uid: &str) -> bool {
        match self.screens.iter().position(|s| s.screen.uid == uid) {
            Some(idx) => {
                let gs = self.screens.remove(idx);
                self.screens.push(gs);
                true
            }
            None => false,
        }
    }

    /// Resolve the overlap of the front-most screen with the others.
    ///
    /// The front screen's target rectangle is moved; its displayed rectangle
    /// follows through the animation.  Returns `true` if a snap happened.
    pub fn snap_front(&mut self) -> bool {
        let rects: Vec<Rect> = self.screens.iter().map(|s| s.target_rect).collect();
        let Some((idx, (dx, dy))) = resolve_overlap(&rects) else {
            return false;
        };
        let other = self.screens[idx].screen.uid.clone();
        let Some(front) = self.screens.last_mut() else {
            return false;
        };
        debug!(
            "snapping {} against {} by ({:.1}, {:.1})",
            front.screen.uid, other, dx, dy
        );
        front.target_rect = front.target_rect.translated(dx, dy);
        true
    }

    /// Center the bounding box of all target rectangles in a viewport of
    /// `viewport` size.
    ///
    /// With `immediate`, both the displayed and the target rectangles move;
    /// otherwise only the targets move and the animation catches up.
    pub fn center(&mut self, viewport: (f64, f64), immediate: bool) {
        let Some(bb) = bounding_box(self.screens.iter().map(|s| &s.target_rect)) else {
            return;
        };
        let (cx, cy) = bb.center();
        let off_x = viewport.0 / 2.0 - cx;
        let off_y = viewport.1 / 2.0 - cy;
        for gs in &mut self.screens {
            gs.target_rect = gs.target_rect.translated(off_x, off_y);
            if immediate {
                gs.rect = gs.rect.translated(off_x, off_y);
            }
        }
    }

    /// Advance every screen's animation by one frame.
    pub fn step_animation(&mut self) {
        for gs in &mut self.screens {
            gs.rect = step_rect(&gs.rect, &gs.target_rect);
        }
    }

    /// Whether every screen has reached its target.
    pub fn at_rest(&self) -> bool {
        self.screens.iter().all(GuiScreen::at_rest)
    }
}
