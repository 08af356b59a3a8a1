//! [`ScreenLoader`] for `wlr-randr` and `xrandr`.
//!
//! Both tools are run without arguments and their human-readable output is
//! parsed.  The parsers are plain functions over the text so they can be
//! tested without a display server.

use crate::command::Backend;
use crate::screen::{parse_transform, Mode, Screen};
use crate::traits::ScreenLoader;
use log::{debug, warn};
use std::process::Command;

/// Errors from running or parsing a randr tool.
#[derive(Debug, thiserror::Error)]
#[error("randr error: {0}")]
pub struct RandrError(String);

/// Loads screens by running `wlr-randr` or `xrandr`.
#[derive(Debug, Clone, Copy)]
pub struct RandrLoader {
    backend: Backend,
}

impl RandrLoader {
    /// A loader for `backend`, or `None` for backends that are not
    /// randr-like.
    pub fn new(backend: Backend) -> Option<Self> {
        match backend {
            Backend::WlrRandr | Backend::Xrandr => Some(Self { backend }),
            Backend::Hyprland => None,
        }
    }
}

impl ScreenLoader for RandrLoader {
    type Error = RandrError;

    fn load(&self) -> Result<Vec<Screen>, RandrError> {
        let program = self.backend.program();
        let output = Command::new(program)
            .output()
            .map_err(|e| RandrError(format!("failed to run {}: {}", program, e)))?;
        if !output.status.success() {
            return Err(RandrError(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        let screens = match self.backend {
            Backend::Xrandr => parse_xrandr(&text),
            _ => parse_wlr_randr(&text),
        };
        debug!("{} reported {} screen(s)", program, screens.len());
        Ok(screens)
    }
}

/// Drop screens without modes and sort by uid.
fn finish(screens: Vec<Screen>) -> Vec<Screen> {
    let mut screens: Vec<Screen> = screens
        .into_iter()
        .filter(|s| {
            if s.available.is_empty() {
                warn!("output {} reports no modes, skipping", s.uid);
            }
            !s.available.is_empty()
        })
        .collect();
    screens.sort_by(|a, b| a.uid.cmp(&b.uid));
    screens
}

//  wlr-randr

/// Parse the output of `wlr-randr`.
///
/// ```text
/// DP-1 "Dell Inc. DELL U2415 7MT0186 (DP-1)"
///   Enabled: yes
///   Modes:
///     1920x1200 px, 59.950001 Hz (preferred, current)
///     1920x1080 px, 60.000000 Hz
///   Position: 0,0
///   Transform: normal
///   Scale: 1.000000
/// ```
pub fn parse_wlr_randr(text: &str) -> Vec<Screen> {
    let mut screens: Vec<Screen> = Vec::new();
    let mut in_modes = false;

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if !line.starts_with(' ') {
            let (uid, name) = line.split_once(' ').unwrap_or((line, ""));
            screens.push(Screen::new(uid, name.trim().trim_matches('"'), Vec::new()));
            in_modes = false;
            continue;
        }
        let Some(screen) = screens.last_mut() else {
            continue;
        };
        let indent = line.len() - line.trim_start().len();
        let line = line.trim();

        if in_modes && indent > 2 {
            if let Some((mode, current)) = parse_wlr_mode(line) {
                screen.available.push(mode);
                if current {
                    screen.mode = Some(mode);
                }
            } else {
                debug!("unparsable mode line: {}", line);
            }
            continue;
        }
        in_modes = false;

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key {
            "Modes" => in_modes = true,
            "Enabled" => screen.active = value == "yes",
            "Position" => {
                if let Some((x, y)) = value.split_once(',') {
                    if let (Ok(x), Ok(y)) = (x.trim().parse(), y.trim().parse()) {
                        screen.position = (x, y);
                    }
                }
            }
            "Transform" => screen.transform = parse_transform(value).unwrap_or(0),
            "Scale" => {
                screen.scale = value.parse().ok().filter(|s: &f64| *s > 0.0).unwrap_or(1.0);
            }
            _ => {}
        }
    }

    for screen in &mut screens {
        if screen.active && screen.mode.is_none() {
            screen.mode = screen.available.first().copied();
        }
    }
    finish(screens)
}

/// `1920x1080 px, 60.000000 Hz (preferred, current)`
fn parse_wlr_mode(line: &str) -> Option<(Mode, bool)> {
    let (res, rest) = line.split_once(',')?;
    let res = res.split_whitespace().next()?;
    let (w, h) = res.split_once('x')?;
    let mut words = rest.split_whitespace();
    let freq: f64 = words.next()?.parse().ok()?;
    let current = rest.contains("current");
    Some((Mode::new(w.parse().ok()?, h.parse().ok()?, freq), current))
}

//  xrandr

/// Parse the output of `xrandr`.
///
/// Disconnected outputs and interlaced modes are skipped.  Outputs carry
/// no description, so the uid doubles as the name.
///
/// ```text
/// Screen 0: minimum 8 x 8, current 3840 x 1080, maximum 32767 x 32767
/// DP-1 connected primary 1920x1080+0+0 (normal left inverted right x axis y axis) 527mm x 296mm
///    1920x1080     60.00*+  74.97    50.00
///    1920x1080i    60.00
/// HDMI-1 disconnected (normal left inverted right x axis y axis)
/// ```
pub fn parse_xrandr(text: &str) -> Vec<Screen> {
    let mut screens: Vec<Screen> = Vec::new();
    let mut current: Option<Screen> = None;

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if !line.starts_with(' ') {
            screens.extend(current.take());
            if line.starts_with("Screen ") {
                continue;
            }
            current = parse_xrandr_header(line);
            continue;
        }
        let Some(screen) = current.as_mut() else {
            continue;
        };
        let mut words = line.split_whitespace();
        let Some(res) = words.next() else {
            continue;
        };
        if res.ends_with('i') {
            continue;
        }
        let Some((w, h)) = res.split_once('x') else {
            continue;
        };
        let (Ok(w), Ok(h)) = (w.parse::<u32>(), h.parse::<u32>()) else {
            continue;
        };
        for word in words {
            let is_current = word.contains('*');
            let rate = word.trim_end_matches(['*', '+']);
            let Ok(freq) = rate.parse::<f64>() else {
                continue;
            };
            let mode = Mode::new(w, h, freq);
            screen.available.push(mode);
            if is_current {
                screen.mode = Some(mode);
            }
        }
    }
    screens.extend(current);

    for screen in &mut screens {
        if screen.mode.is_none() {
            screen.active = false;
        }
    }
    finish(screens)
}

/// `DP-2 connected 1920x1080+1920+0 left (normal left ...) 527mm x 296mm`
fn parse_xrandr_header(line: &str) -> Option<Screen> {
    let mut words = line.split_whitespace();
    let uid = words.next()?;
    if words.next()? != "connected" {
        return None;
    }
    let mut screen = Screen::new(uid, uid, Vec::new());
    for word in line.split('(').next().unwrap_or("").split_whitespace().skip(2) {
        if let Some((x, y)) = parse_geometry(word) {
            screen.active = true;
            screen.position = (x, y);
        } else if let Some(t) = xrandr_rotation(word) {
            screen.transform = t;
        }
    }
    Some(screen)
}

/// The position part of `WxH+X+Y`.
fn parse_geometry(word: &str) -> Option<(i32, i32)> {
    let (size, _) = word.split_once(['+', '-'])?;
    size.split_once('x')?;
    let pos = &word[size.len()..];
    let split = pos[1..].find(['+', '-'])? + 1;
    let x = pos[..split].parse().ok()?;
    let y = pos[split..].parse().ok()?;
    Some((x, y))
}

fn xrandr_rotation(word: &str) -> Option<u8> {
    match word {
        "left" => Some(1),
        "inverted" => Some(2),
        "right" => Some(3),
        _ => None,
    }
}
