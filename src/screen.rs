//! Screens, modes and mode selection helpers.
//!
//! A [`Screen`] is one physical output as reported by the display server.
//! Screens are produced by a [`ScreenLoader`](crate::traits::ScreenLoader)
//! and are otherwise plain data: nothing in this module talks to a display
//! server.

use std::fmt;

/// One display timing supported by an output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mode {
    /// Horizontal resolution in pixels.
    pub width: u32,
    /// Vertical resolution in pixels.
    pub height: u32,
    /// Refresh rate in Hz.
    pub freq: f64,
}

impl Mode {
    pub fn new(width: u32, height: u32, freq: f64) -> Self {
        Self {
            width,
            height,
            freq,
        }
    }

    /// Whether this mode has the given resolution.
    pub fn has_resolution(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{:.2}Hz", self.width, self.height, self.freq)
    }
}

/// Names used by `wlr-randr` for the eight transform codes.
const TRANSFORM_NAMES: [&str; 8] = [
    "normal",
    "90",
    "180",
    "270",
    "flipped",
    "flipped-90",
    "flipped-180",
    "flipped-270",
];

/// The `wlr-randr` name of a transform code, or `None` if out of range.
pub fn transform_name(transform: u8) -> Option<&'static str> {
    TRANSFORM_NAMES.get(transform as usize).copied()
}

/// Parse a `wlr-randr` transform name back into its code.
pub fn parse_transform(name: &str) -> Option<u8> {
    TRANSFORM_NAMES
        .iter()
        .position(|n| *n == name.trim())
        .map(|i| i as u8)
}

/// A physical output known to the display server.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    /// Stable port identifier (e.g. `"DP-1"`).
    pub uid: String,
    /// Human-readable description.
    pub name: String,
    /// Whether the output is enabled.
    pub active: bool,
    /// Top-left corner in real pixels (y grows downward).
    pub position: (i32, i32),
    /// Current mode.  Always `Some` and a member of `available` when
    /// `active` is true.
    pub mode: Option<Mode>,
    /// Output scale factor (> 0).
    pub scale: f64,
    /// Rotation / flip code in `0..=7`.  Odd values swap width and height.
    pub transform: u8,
    /// Every mode the output supports, in the order reported.
    pub available: Vec<Mode>,
}

impl Screen {
    /// Create an inactive screen at the origin with default scale and
    /// transform.
    pub fn new(uid: impl Into<String>, name: impl Into<String>, available: Vec<Mode>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            active: false,
            position: (0, 0),
            mode: None,
            scale: 1.0,
            transform: 0,
            available,
        }
    }

    /// Builder: mark the screen active with `mode`.
    pub fn activated(mut self, mode: Mode) -> Self {
        self.active = true;
        self.mode = Some(mode);
        self
    }

    /// Builder: set the real position.
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.position = (x, y);
        self
    }

    /// Whether the transform rotates the output by 90 or 270 degrees.
    pub fn is_rotated(&self) -> bool {
        self.transform % 2 == 1
    }

    /// The mode used to size the screen in the editor: the current mode, or
    /// the available mode with the largest area (highest refresh rate on
    /// ties) when there is none.
    pub fn display_mode(&self) -> Option<Mode> {
        self.mode.or_else(|| {
            let area = |m: &Mode| m.width as u64 * m.height as u64;
            self.available
                .iter()
                .max_by(|a, b| area(a).cmp(&area(b)).then(a.freq.total_cmp(&b.freq)))
                .copied()
        })
    }

    /// Logical size in real pixels: mode size divided by the scale, swapped
    /// for rotated transforms.
    pub fn effective_size(&self) -> (f64, f64) {
        let Some(mode) = self.display_mode() else {
            return (0.0, 0.0);
        };
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        let w = mode.width as f64 / scale;
        let h = mode.height as f64 / scale;
        if self.is_rotated() {
            (h, w)
        } else {
            (w, h)
        }
    }

    /// Human-readable description with hexadecimal serial-number words
    /// removed, for status lines.
    pub fn short_name(&self) -> String {
        self.name
            .split_whitespace()
            .filter(|w| !w.chars().all(|c| c.is_ascii_digit() || c == 'x'))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} ", self.uid, if self.active { "*" } else { "" })?;
        match &self.mode {
            Some(m) => write!(f, "[{}]", m),
            None => write!(f, "[off]"),
        }
    }
}

/// Distinct resolutions in `modes`, largest first.
pub fn sorted_resolutions(modes: &[Mode]) -> Vec<(u32, u32)> {
    let mut res: Vec<(u32, u32)> = modes.iter().map(|m| (m.width, m.height)).collect();
    res.sort_unstable_by(|a, b| b.cmp(a));
    res.dedup();
    res
}

/// Distinct refresh rates for the given resolution, highest first.
pub fn sorted_frequencies(modes: &[Mode], width: u32, height: u32) -> Vec<f64> {
    let mut freqs: Vec<f64> = modes
        .iter()
        .filter(|m| m.has_resolution(width, height))
        .map(|m| m.freq)
        .collect();
    freqs.sort_by(|a, b| b.total_cmp(a));
    freqs.dedup();
    freqs
}

/// The mode in `modes` with exactly this resolution and refresh rate.
pub fn find_matching_mode(modes: &[Mode], width: u32, height: u32, freq: f64) -> Option<Mode> {
    modes
        .iter()
        .find(|m| m.has_resolution(width, height) && m.freq == freq)
        .copied()
}

/// The mode closest to the requested one: same resolution with the nearest
/// refresh rate if possible, otherwise the nearest resolution.
///
/// Only loaders use this, to recover the current mode when the display
/// server reports a rate that is not in its own mode list.
pub fn closest_mode(modes: &[Mode], width: u32, height: u32, freq: f64) -> Option<Mode> {
    let distance = |m: &Mode| {
        let dw = (m.width as f64 - width as f64).abs();
        let dh = (m.height as f64 - height as f64).abs();
        (dw + dh, (m.freq - freq).abs())
    };
    modes
        .iter()
        .min_by(|a, b| {
            let (ra, fa) = distance(a);
            let (rb, fb) = distance(b);
            ra.total_cmp(&rb).then(fa.total_cmp(&fb))
        })
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modes() -> Vec<Mode> {
        vec![
            Mode::new(1920, 1080, 60.0),
            Mode::new(1920, 1080, 144.0),
            Mode::new(1280, 720, 60.0),
            Mode::new(2560, 1440, 59.951),
            Mode::new(1920, 1080, 60.0),
        ]
    }

    #[test]
    fn mode_display() {
        assert_eq!(Mode::new(1920, 1080, 59.951).to_string(), "1920x1080@59.95Hz");
    }

    #[test]
    fn find_matching_mode_exact() {
        let m = find_matching_mode(&modes(), 1920, 1080, 60.0);
        assert_eq!(m, Some(Mode::new(1920, 1080, 60.0)));
    }

    #[test]
    fn find_matching_mode_no_match() {
        assert_eq!(find_matching_mode(&modes(), 1920, 1080, 75.0), None);
        assert_eq!(find_matching_mode(&modes(), 800, 600, 60.0), None);
    }

    #[test]
    fn resolutions_are_distinct_and_descending() {
        assert_eq!(
            sorted_resolutions(&modes()),
            vec![(2560, 1440), (1920, 1080), (1280, 720)]
        );
    }

    #[test]
    fn frequencies_filter_by_resolution() {
        assert_eq!(sorted_frequencies(&modes(), 1920, 1080), vec![144.0, 60.0]);
        assert!(sorted_frequencies(&modes(), 640, 480).is_empty());
    }

    #[test]
    fn closest_mode_prefers_same_resolution() {
        let m = closest_mode(&modes(), 2560, 1440, 60.0).unwrap();
        assert_eq!(m, Mode::new(2560, 1440, 59.951));
        let m = closest_mode(&modes(), 1920, 1080, 143.9).unwrap();
        assert_eq!(m.freq, 144.0);
    }

    #[test]
    fn transform_names_round_trip() {
        assert_eq!(transform_name(0), Some("normal"));
        assert_eq!(transform_name(5), Some("flipped-90"));
        assert_eq!(transform_name(8), None);
        assert_eq!(parse_transform("flipped-270"), Some(7));
        assert_eq!(parse_transform("sideways"), None);
    }

    #[test]
    fn inactive_screen_sizes_to_largest_mode() {
        let s = Screen::new("HDMI-A-1", "TV", modes());
        assert!(s.mode.is_none());
        assert_eq!(s.effective_size(), (2560.0, 1440.0));
    }

    #[test]
    fn display_mode_is_a_real_mode() {
        let modes = vec![
            Mode::new(1920, 1200, 60.0),
            Mode::new(2560, 1080, 60.0),
            Mode::new(2560, 1080, 75.0),
        ];
        let s = Screen::new("DP-3", "Ultrawide", modes);
        assert_eq!(s.display_mode(), Some(Mode::new(2560, 1080, 75.0)));
        let active = s.clone().activated(Mode::new(1920, 1200, 60.0));
        assert_eq!(active.display_mode(), Some(Mode::new(1920, 1200, 60.0)));
    }

    #[test]
    fn short_name_strips_serials() {
        let s = Screen::new("DP-1", "Dell Inc. U2415 0x1234ABCD 7MT0186", vec![]);
        assert_eq!(s.short_name(), "Dell Inc. U2415 0x1234ABCD 7MT0186");
        let s = Screen::new("DP-1", "Dell Inc. U2415 0x12345 12345", vec![]);
        assert_eq!(s.short_name(), "Dell Inc. U2415");
    }
}
