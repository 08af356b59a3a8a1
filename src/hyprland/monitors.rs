//! [`ScreenLoader`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock` and
//! asks for `j/monitors all`, which also lists disabled outputs:
//!
//! ```json
//! [{
//!   "name": "DP-1",
//!   "description": "Dell Inc. DELL U2415 7MT0186",
//!   "width": 1920, "height": 1200, "refreshRate": 59.95,
//!   "x": 0, "y": 0, "scale": 1.00, "transform": 0,
//!   "disabled": false,
//!   "availableModes": ["1920x1200@59.95Hz", "1600x1200@60.00Hz"]
//! }]
//! ```

use crate::screen::{closest_mode, find_matching_mode, Mode, Screen};
use crate::traits::ScreenLoader;
use log::{debug, warn};
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Hyprland-backed screen loader.
///
/// Each [`load`](ScreenLoader::load) opens a short-lived IPC request.  No
/// child processes are spawned.
#[derive(Debug, Default)]
pub struct HyprlandLoader;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandError(String);

impl HyprlandLoader {
    pub fn new() -> Self {
        Self
    }
}

//  Direct Hyprland IPC helpers

/// Resolve the Hyprland command socket path.
fn socket_path() -> Result<PathBuf, HyprlandError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!("{}/hypr/{}/.socket.sock", runtime_dir, his)))
}

/// Send a JSON data query (`j/<command>`) and return the raw response.
fn ipc_json(data_command: &str) -> Result<String, HyprlandError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(format!("j/{}", data_command).as_bytes())
        .map_err(|e| HyprlandError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandError(format!("utf-8: {}", e)))
}

//  JSON model

/// Subset of the JSON object returned by `j/monitors all`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonitorJson {
    name: String,
    #[serde(default)]
    description: String,
    width: u32,
    height: u32,
    #[serde(default)]
    refresh_rate: f64,
    x: i32,
    y: i32,
    #[serde(default = "one")]
    scale: f64,
    #[serde(default)]
    transform: u8,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    available_modes: Vec<String>,
}

fn one() -> f64 {
    1.0
}

/// Parse a Hyprland mode string such as `"1920x1080@59.95Hz"`.
pub fn parse_mode(s: &str) -> Option<Mode> {
    let (res, freq) = s.trim().split_once('@')?;
    let (w, h) = res.split_once('x')?;
    let freq = freq.trim_end_matches("Hz").parse().ok()?;
    Some(Mode::new(w.parse().ok()?, h.parse().ok()?, freq))
}

/// Convert the `j/monitors all` response into screens, sorted by uid.
///
/// Monitors without any parsable mode are dropped.
pub fn parse_monitors(json: &str) -> Result<Vec<Screen>, HyprlandError> {
    let monitors: Vec<MonitorJson> =
        serde_json::from_str(json).map_err(|e| HyprlandError(format!("parse: {}", e)))?;

    let mut screens: Vec<Screen> = monitors
        .into_iter()
        .filter_map(|m| {
            let available: Vec<Mode> = m.available_modes.iter().filter_map(|s| parse_mode(s)).collect();
            if available.is_empty() {
                warn!("monitor {} reports no usable modes, skipping", m.name);
                return None;
            }
            // refreshRate is reported unrounded while availableModes carry two
            // decimals.
            let rounded = (m.refresh_rate * 100.0).round() / 100.0;
            let mode = find_matching_mode(&available, m.width, m.height, rounded)
                .or_else(|| closest_mode(&available, m.width, m.height, m.refresh_rate));
            let mut screen = Screen::new(m.name, m.description, available).at(m.x, m.y);
            screen.active = !m.disabled;
            screen.mode = mode;
            screen.scale = if m.scale > 0.0 { m.scale } else { 1.0 };
            screen.transform = m.transform % 8;
            debug!("hyprland monitor {}", screen);
            Some(screen)
        })
        .collect();
    screens.sort_by(|a, b| a.uid.cmp(&b.uid));
    Ok(screens)
}

//  ScreenLoader implementation

impl ScreenLoader for HyprlandLoader {
    type Error = HyprlandError;

    fn load(&self) -> Result<Vec<Screen>, Self::Error> {
        let json = ipc_json("monitors all")?;
        parse_monitors(&json)
    }
}
