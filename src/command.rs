//! Display-server command synthesis.
//!
//! Turns the editor arrangement back into a single shell command for the
//! selected [`Backend`].  The command string is the only thing the outside
//! world sees of the editor, so it is fully deterministic: identical layouts
//! always produce byte-identical commands.
//!
//! ```text
//! wlr-randr --output DP-1 --on --pos 0,0 --mode 1920x1080 --output HDMI-A-1 --off
//! xrandr --output DP-1 --on --pos 0x0 --mode 1920x1080 --output HDMI-A-1 --off
//! hyprctl --batch "keyword monitor DP-1,1920x1080@60,0x0,1,transform,0 ; keyword monitor HDMI-A-1,disable"
//! ```

use crate::geometry::Rect;
use crate::layout::Layout;
use crate::screen::{transform_name, Screen};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The display-server tool a command is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// wlroots compositors, through `wlr-randr`.
    WlrRandr,
    /// X11, through `xrandr`.
    Xrandr,
    /// Hyprland, through `hyprctl --batch`.
    Hyprland,
}

impl Backend {
    /// Program name used as the command prefix.
    pub fn program(&self) -> &'static str {
        match self {
            Backend::WlrRandr => "wlr-randr",
            Backend::Xrandr => "xrandr",
            Backend::Hyprland => "hyprctl",
        }
    }

    /// Guess the backend from the session environment.
    ///
    /// Hyprland is preferred when its instance signature is set, then any
    /// Wayland session uses `wlr-randr`, and everything else falls back to
    /// `xrandr`.
    pub fn detect() -> Self {
        Self::detect_from(|key| std::env::var(key).ok())
    }

    /// [`detect`](Self::detect) with an injectable environment lookup.
    pub fn detect_from(env: impl Fn(&str) -> Option<String>) -> Self {
        let set = |key: &str| env(key).is_some_and(|v| !v.is_empty());
        if set("HYPRLAND_INSTANCE_SIGNATURE") {
            Backend::Hyprland
        } else if set("WAYLAND_DISPLAY") {
            Backend::WlrRandr
        } else {
            Backend::Xrandr
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Parse a backend name (case-insensitive; accepts "wlr-randr", "wlr",
/// "xrandr", "x11", "hyprland", "hyprctl").
pub fn parse_backend(s: &str) -> Option<Backend> {
    let normalized: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect();
    match normalized.as_str() {
        "wlrrandr" | "wlr" | "wayland" => Some(Backend::WlrRandr),
        "xrandr" | "x11" | "x" => Some(Backend::Xrandr),
        "hyprland" | "hyprctl" | "hypr" => Some(Backend::Hyprland),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for Backend {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_backend(&s).ok_or_else(|| DeError::custom(format!("invalid backend: {:?}", s)))
    }
}

impl Serialize for Backend {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.program())
    }
}

/// Scale editor rects back to real pixels and re-anchor them.
///
/// Every rect is multiplied by `ui_ratio`, then shifted so the leftmost edge
/// is at `x = 0` and the highest top edge is at `y = 0`, flipping to y-down:
/// `x' = x - min_x`, `y' = max_y - (y + height)`.
///
/// All rects take part in the trimming, including those of inactive screens.
pub fn normalized_positions(rects: &[Rect], ui_ratio: f64) -> Vec<(i32, i32)> {
    let scaled: Vec<Rect> = rects.iter().map(|r| r.scaled(ui_ratio)).collect();
    let min_x = scaled.iter().map(|r| r.x).fold(f64::INFINITY, f64::min);
    let max_y = scaled.iter().map(|r| r.top()).fold(f64::NEG_INFINITY, f64::max);
    scaled
        .iter()
        .map(|r| {
            let x = r.x - min_x;
            let y = max_y - r.top();
            (x.round() as i32, y.round() as i32)
        })
        .collect()
}

/// `xrandr --rotate` name for the rotation part of a transform code, `None`
/// when unrotated.
fn xrandr_rotate_name(transform: u8) -> Option<&'static str> {
    match transform % 4 {
        1 => Some("left"),
        2 => Some("inverted"),
        3 => Some("right"),
        _ => None,
    }
}

/// Command fragment for one screen at real position `pos`.
fn fragment(backend: Backend, screen: &Screen, pos: (i32, i32)) -> String {
    let uid = &screen.uid;
    let mode = match (screen.active, screen.mode) {
        (true, Some(mode)) => mode,
        _ => {
            return match backend {
                Backend::WlrRandr | Backend::Xrandr => format!("--output {} --off", uid),
                Backend::Hyprland => format!("keyword monitor {},disable", uid),
            };
        }
    };
    let (x, y) = pos;
    match backend {
        Backend::WlrRandr => {
            let mut out = format!(
                "--output {} --on --pos {},{} --mode {}x{}",
                uid, x, y, mode.width, mode.height
            );
            if screen.scale != 1.0 {
                out.push_str(&format!(" --scale {}", screen.scale));
            }
            if let Some(name) = transform_name(screen.transform).filter(|_| screen.transform != 0) {
                out.push_str(&format!(" --transform {}", name));
            }
            out
        }
        Backend::Xrandr => {
            let mut out = format!(
                "--output {} --on --pos {}x{} --mode {}x{}",
                uid, x, y, mode.width, mode.height
            );
            if let Some(rotation) = xrandr_rotate_name(screen.transform) {
                out.push_str(&format!(" --rotate {}", rotation));
            }
            if screen.transform >= 4 {
                out.push_str(" --reflect x");
            }
            out
        }
        Backend::Hyprland => format!(
            "keyword monitor {},{}x{}@{},{}x{},{},transform,{}",
            uid, mode.width, mode.height, mode.freq, x, y, screen.scale, screen.transform
        ),
    }
}

/// Build the command applying `entries` (screen plus its editor rect).
pub fn synthesize(backend: Backend, entries: &[(&Screen, Rect)], ui_ratio: f64) -> String {
    let rects: Vec<Rect> = entries.iter().map(|(_, r)| *r).collect();
    let positions = normalized_positions(&rects, ui_ratio);
    let fragments: Vec<String> = entries
        .iter()
        .zip(positions)
        .map(|((screen, _), pos)| fragment(backend, screen, pos))
        .collect();
    match backend {
        Backend::WlrRandr | Backend::Xrandr => {
            let mut parts = vec![backend.program().to_string()];
            parts.extend(fragments);
            parts.join(" ")
        }
        Backend::Hyprland => format!("hyprctl --batch \"{}\"", fragments.join(" ; ")),
    }
}

/// Build the command applying the target arrangement of `layout`.
///
/// Outputs are listed in uid order, not drawing order, so raising a screen
/// in the editor never changes the command.
pub fn synthesize_layout(backend: Backend, layout: &Layout, ui_ratio: f64) -> String {
    let mut entries: Vec<(&Screen, Rect)> = layout
        .screens()
        .iter()
        .map(|gs| (&gs.screen, gs.target_rect))
        .collect();
    entries.sort_by(|a, b| a.0.uid.cmp(&b.0.uid));
    synthesize(backend, &entries, ui_ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::Mode;

    fn fhd() -> Mode {
        Mode::new(1920, 1080, 60.0)
    }

    fn two_plus_off() -> (Vec<Screen>, Vec<Rect>) {
        let screens = vec![
            Screen::new("DP-1", "Left", vec![fhd()]).activated(fhd()),
            Screen::new("DP-2", "Right", vec![fhd()]).activated(fhd()),
            Screen::new("HDMI-A-1", "TV", vec![fhd()]),
        ];
        let rects = vec![
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(1920.0, 0.0, 1920.0, 1080.0),
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
        ];
        (screens, rects)
    }

    fn entries<'a>(screens: &'a [Screen], rects: &[Rect]) -> Vec<(&'a Screen, Rect)> {
        screens.iter().zip(rects.iter().copied()).collect()
    }

    #[test]
    fn trim_and_flip_keeps_aligned_layout() {
        let (_, rects) = two_plus_off();
        assert_eq!(
            normalized_positions(&rects, 1.0),
            vec![(0, 0), (1920, 0), (0, 0)]
        );
    }

    #[test]
    fn trim_and_flip_rebases_and_flips() {
        // Editor y-up: the second screen sits below the first.
        let rects = [
            Rect::new(100.0, 50.0, 240.0, 135.0),
            Rect::new(130.0, -85.0, 160.0, 135.0),
        ];
        assert_eq!(
            normalized_positions(&rects, 8.0),
            vec![(0, 0), (240, 1080)]
        );
    }

    #[test]
    fn wlr_randr_command() {
        let (screens, rects) = two_plus_off();
        let cmd = synthesize(Backend::WlrRandr, &entries(&screens, &rects), 1.0);
        assert_eq!(
            cmd,
            "wlr-randr --output DP-1 --on --pos 0,0 --mode 1920x1080 \
             --output DP-2 --on --pos 1920,0 --mode 1920x1080 \
             --output HDMI-A-1 --off"
        );
    }

    #[test]
    fn xrandr_command() {
        let (screens, rects) = two_plus_off();
        let cmd = synthesize(Backend::Xrandr, &entries(&screens, &rects), 1.0);
        assert!(cmd.starts_with("xrandr "));
        assert!(cmd.contains("--output DP-1 --on --pos 0x0 --mode 1920x1080"));
        assert!(cmd.contains("--output DP-2 --on --pos 1920x0 --mode 1920x1080"));
        assert!(cmd.ends_with("--output HDMI-A-1 --off"));
    }

    #[test]
    fn xrandr_appends_rotation_and_reflection() {
        let (mut screens, rects) = two_plus_off();
        screens[0].transform = 1;
        screens[1].transform = 6;
        let cmd = synthesize(Backend::Xrandr, &entries(&screens, &rects), 1.0);
        assert!(cmd.contains("--output DP-1 --on --pos 0x0 --mode 1920x1080 --rotate left --output"));
        assert!(cmd.contains("--pos 1920x0 --mode 1920x1080 --rotate inverted --reflect x --output"));
    }

    #[test]
    fn hyprland_command() {
        let (mut screens, rects) = two_plus_off();
        screens[1].scale = 1.5;
        screens[1].transform = 1;
        screens[1].mode = Some(Mode::new(1920, 1080, 59.951));
        let cmd = synthesize(Backend::Hyprland, &entries(&screens, &rects), 1.0);
        assert_eq!(
            cmd,
            "hyprctl --batch \"keyword monitor DP-1,1920x1080@60,0x0,1,transform,0 ; \
             keyword monitor DP-2,1920x1080@59.951,1920x0,1.5,transform,1 ; \
             keyword monitor HDMI-A-1,disable\""
        );
    }

    #[test]
    fn wlr_randr_appends_non_default_scale_and_transform() {
        let mode = Mode::new(3840, 2160, 60.0);
        let mut s = Screen::new("eDP-1", "Laptop", vec![mode]).activated(mode);
        s.scale = 2.0;
        s.transform = 3;
        let cmd = synthesize(Backend::WlrRandr, &[(&s, Rect::new(5.0, 5.0, 1.0, 1.0))], 1.0);
        assert_eq!(
            cmd,
            "wlr-randr --output eDP-1 --on --pos 0,0 --mode 3840x2160 --scale 2 --transform 270"
        );
    }

    #[test]
    fn synthesis_is_deterministic() {
        let (screens, rects) = two_plus_off();
        let e = entries(&screens, &rects);
        for backend in [Backend::WlrRandr, Backend::Xrandr, Backend::Hyprland] {
            assert_eq!(synthesize(backend, &e, 8.0), synthesize(backend, &e, 8.0));
        }
    }

    #[test]
    fn backend_detection() {
        let env = |vars: &'static [(&'static str, &'static str)]| {
            move |k: &str| vars.iter().find(|(n, _)| *n == k).map(|(_, v)| v.to_string())
        };
        assert_eq!(
            Backend::detect_from(env(&[("HYPRLAND_INSTANCE_SIGNATURE", "abc"), ("WAYLAND_DISPLAY", "wayland-1")])),
            Backend::Hyprland
        );
        assert_eq!(Backend::detect_from(env(&[("WAYLAND_DISPLAY", "wayland-1")])), Backend::WlrRandr);
        assert_eq!(Backend::detect_from(env(&[("WAYLAND_DISPLAY", "")])), Backend::Xrandr);
        assert_eq!(Backend::detect_from(env(&[])), Backend::Xrandr);
    }

    #[test]
    fn backend_names_parse() {
        assert_eq!(parse_backend("wlr-randr"), Some(Backend::WlrRandr));
        assert_eq!(parse_backend(" XRandR "), Some(Backend::Xrandr));
        assert_eq!(parse_backend("hyprctl"), Some(Backend::Hyprland));
        assert_eq!(parse_backend("sway"), None);
        let b: Backend = serde_json::from_str("\"Hyprland\"").unwrap();
        assert_eq!(b, Backend::Hyprland);
        assert!(serde_json::from_str::<Backend>("\"gnome\"").is_err());
        assert_eq!(serde_json::to_string(&Backend::WlrRandr).unwrap(), "\"wlr-randr\"");
    }
}
