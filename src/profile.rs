//! Saved layouts.
//!
//! A [`Profile`] records, for every screen, whether it is enabled, its mode
//! and its absolute position in real (y-down) coordinates.  Profiles are
//! matched back to live screens by uid.

use crate::command::normalized_positions;
use crate::geometry::{real_to_editor, Rect};
use crate::layout::Layout;
use crate::screen::{find_matching_mode, Mode};
use log::debug;
use serde::{Deserialize, Serialize};

/// Current on-disk profile format.
pub const PROFILE_VERSION: u32 = 1;

fn default_version() -> u32 {
    PROFILE_VERSION
}

fn default_scale() -> f64 {
    1.0
}

/// One screen inside a [`Profile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileScreen {
    pub uid: String,
    pub active: bool,
    pub width: u32,
    pub height: u32,
    pub freq: f64,
    /// Absolute real x position.
    pub x: i32,
    /// Absolute real y position (y grows downward).
    pub y: i32,
    /// Output scale.  Defaults to `1` when absent.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Transform code.  Defaults to `0` when absent.
    #[serde(default)]
    pub transform: u8,
}

/// A named layout as persisted by a [`ProfileStore`](crate::traits::ProfileStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub screens: Vec<ProfileScreen>,
}

/// Errors from applying a profile.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ProfileError {
    /// The profile asks for a mode the screen does not support.
    #[error("mode {width}x{height}@{freq}Hz not available on {uid}")]
    ModeNotFound {
        uid: String,
        width: u32,
        height: u32,
        freq: f64,
    },
    /// The profile was written by a newer version.
    #[error("unsupported profile version {0}")]
    UnsupportedVersion(u32),
}

impl Profile {
    /// Record the target arrangement of `layout`.
    ///
    /// Positions are trimmed and flipped exactly as for command synthesis,
    /// so applying the profile later reproduces the same command.
    pub fn from_layout(layout: &Layout, ui_ratio: f64) -> Self {
        let rects: Vec<Rect> = layout.screens().iter().map(|gs| gs.target_rect).collect();
        let positions = normalized_positions(&rects, ui_ratio);
        let screens = layout
            .screens()
            .iter()
            .zip(positions)
            .map(|(gs, (x, y))| {
                let s = &gs.screen;
                let mode = s.display_mode().unwrap_or(Mode::new(0, 0, 0.0));
                ProfileScreen {
                    uid: s.uid.clone(),
                    active: s.active,
                    width: mode.width,
                    height: mode.height,
                    freq: mode.freq,
                    x,
                    y,
                    scale: s.scale,
                    transform: s.transform,
                }
            })
            .collect();
        Self {
            version: PROFILE_VERSION,
            screens,
        }
    }

    /// Apply this profile to the matching screens of `layout`.
    ///
    /// Profile entries for uids that are not connected are ignored, and
    /// connected screens the profile does not mention are left untouched.
    /// Every mode is resolved before anything changes: on
    /// [`ProfileError::ModeNotFound`] the layout is unmodified.
    ///
    /// Only target rectangles move; the caller re-centres the layout and the
    /// animation carries the screens over.  Screens the profile does not
    /// mention are moved into the same real-pixel frame as the profile
    /// entries, at the position they currently occupy, so they keep their
    /// real placement.  Returns the number of screens updated.
    pub fn apply(&self, layout: &mut Layout, ui_ratio: f64) -> Result<usize, ProfileError> {
        if self.version > PROFILE_VERSION {
            return Err(ProfileError::UnsupportedVersion(self.version));
        }

        let mut resolved: Vec<(&ProfileScreen, Option<Mode>)> = Vec::new();
        for entry in &self.screens {
            let Some(gs) = layout.get(&entry.uid) else {
                debug!("profile references unknown screen {}, skipping", entry.uid);
                continue;
            };
            let mode = find_matching_mode(&gs.screen.available, entry.width, entry.height, entry.freq);
            match (mode, entry.active) {
                (Some(m), _) => resolved.push((entry, Some(m))),
                // An inactive entry may carry a placeholder mode.
                (None, false) => resolved.push((entry, None)),
                (None, true) => {
                    return Err(ProfileError::ModeNotFound {
                        uid: entry.uid.clone(),
                        width: entry.width,
                        height: entry.height,
                        freq: entry.freq,
                    })
                }
            }
        }

        if resolved.is_empty() {
            return Ok(0);
        }

        let rects: Vec<Rect> = layout.screens().iter().map(|gs| gs.target_rect).collect();
        let current = normalized_positions(&rects, ui_ratio);
        for (gs, (x, y)) in layout.screens_mut().iter_mut().zip(current) {
            if resolved.iter().any(|(entry, _)| entry.uid == gs.screen.uid) {
                continue;
            }
            let r = gs.target_rect;
            gs.target_rect = Rect::new(
                x as f64 / ui_ratio,
                -(y as f64 / ui_ratio) - r.height,
                r.width,
                r.height,
            );
        }

        for (entry, mode) in &resolved {
            let Some(gs) = layout.get_mut(&entry.uid) else {
                continue;
            };
            gs.screen.active = entry.active;
            if mode.is_some() {
                gs.screen.mode = *mode;
            }
            gs.screen.position = (entry.x, entry.y);
            gs.screen.scale = if entry.scale > 0.0 { entry.scale } else { 1.0 };
            gs.screen.transform = entry.transform;
            gs.target_rect = real_to_editor(&gs.screen, ui_ratio);
        }
        Ok(resolved.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{synthesize_layout, Backend};
    use crate::layout::ColorSequence;
    use crate::screen::Screen;

    fn fhd() -> Mode {
        Mode::new(1920, 1080, 60.0)
    }

    fn qhd() -> Mode {
        Mode::new(2560, 1440, 144.0)
    }

    fn layout() -> Layout {
        let screens = vec![
            Screen::new("DP-1", "Desk", vec![fhd(), qhd()]).activated(fhd()),
            Screen::new("DP-2", "Side", vec![fhd()]).activated(fhd()).at(1920, 0),
        ];
        Layout::from_screens(screens, 8.0, &mut ColorSequence::new())
    }

    #[test]
    fn from_layout_records_absolute_positions() {
        let mut l = layout();
        l.center((1000.0, 800.0), true);
        let p = Profile::from_layout(&l, 8.0);
        assert_eq!(p.version, PROFILE_VERSION);
        assert_eq!(p.screens.len(), 2);
        assert_eq!((p.screens[0].x, p.screens[0].y), (0, 0));
        assert_eq!((p.screens[1].x, p.screens[1].y), (1920, 0));
        assert_eq!(p.screens[1].freq, 60.0);
    }

    #[test]
    fn apply_updates_mode_and_position() {
        let mut l = layout();
        let profile = Profile {
            version: 1,
            screens: vec![
                ProfileScreen {
                    uid: "DP-1".into(),
                    active: true,
                    width: 2560,
                    height: 1440,
                    freq: 144.0,
                    x: 0,
                    y: 1080,
                    scale: 1.0,
                    transform: 0,
                },
                ProfileScreen {
                    uid: "DP-2".into(),
                    active: false,
                    width: 1920,
                    height: 1080,
                    freq: 60.0,
                    x: 0,
                    y: 0,
                    scale: 1.0,
                    transform: 0,
                },
            ],
        };
        assert_eq!(profile.apply(&mut l, 8.0), Ok(2));
        let dp1 = l.get("DP-1").unwrap();
        assert_eq!(dp1.screen.mode, Some(qhd()));
        assert_eq!(dp1.target_rect, Rect::new(0.0, -315.0, 320.0, 180.0));
        assert!(!l.get("DP-2").unwrap().screen.active);
    }

    #[test]
    fn apply_missing_mode_leaves_layout_untouched() {
        let mut l = layout();
        let before: Vec<Rect> = l.screens().iter().map(|s| s.target_rect).collect();
        let profile = Profile {
            version: 1,
            screens: vec![
                ProfileScreen {
                    uid: "DP-1".into(),
                    active: true,
                    width: 1920,
                    height: 1080,
                    freq: 60.0,
                    x: 500,
                    y: 0,
                    scale: 1.0,
                    transform: 0,
                },
                ProfileScreen {
                    uid: "DP-2".into(),
                    active: true,
                    width: 3840,
                    height: 2160,
                    freq: 60.0,
                    x: 0,
                    y: 0,
                    scale: 1.0,
                    transform: 0,
                },
            ],
        };
        let err = profile.apply(&mut l, 8.0).unwrap_err();
        assert!(matches!(err, ProfileError::ModeNotFound { ref uid, .. } if uid == "DP-2"));
        let after: Vec<Rect> = l.screens().iter().map(|s| s.target_rect).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn apply_ignores_unknown_uids() {
        let mut l = layout();
        let profile = Profile {
            version: 1,
            screens: vec![ProfileScreen {
                uid: "VGA-1".into(),
                active: true,
                width: 1024,
                height: 768,
                freq: 60.0,
                x: 0,
                y: 0,
                scale: 1.0,
                transform: 0,
            }],
        };
        assert_eq!(profile.apply(&mut l, 8.0), Ok(0));
    }

    #[test]
    fn partial_profile_keeps_other_screens_in_place() {
        let mut l = layout();
        l.center((1000.0, 800.0), true);
        let expected = synthesize_layout(Backend::WlrRandr, &l, 8.0);
        let profile = Profile {
            version: 1,
            screens: vec![ProfileScreen {
                uid: "DP-1".into(),
                active: true,
                width: 1920,
                height: 1080,
                freq: 60.0,
                x: 0,
                y: 0,
                scale: 1.0,
                transform: 0,
            }],
        };
        assert_eq!(profile.apply(&mut l, 8.0), Ok(1));
        assert_eq!(synthesize_layout(Backend::WlrRandr, &l, 8.0), expected);
        assert_eq!(l.get("DP-2").unwrap().target_rect, Rect::new(240.0, -135.0, 240.0, 135.0));
    }

    #[test]
    fn newer_versions_are_rejected() {
        let mut l = layout();
        let profile = Profile {
            version: PROFILE_VERSION + 1,
            screens: vec![],
        };
        assert_eq!(
            profile.apply(&mut l, 8.0),
            Err(ProfileError::UnsupportedVersion(PROFILE_VERSION + 1))
        );
    }

    #[test]
    fn save_then_apply_reproduces_command() {
        let mut l = layout();
        l.center((1000.0, 800.0), true);
        let expected = synthesize_layout(Backend::WlrRandr, &l, 8.0);
        let profile = Profile::from_layout(&l, 8.0);

        // Scramble the layout, then restore it from the profile.
        l.get_mut("DP-2").unwrap().set_position(-400.0, 300.0);
        profile.apply(&mut l, 8.0).unwrap();
        assert_eq!(synthesize_layout(Backend::WlrRandr, &l, 8.0), expected);
    }

    #[test]
    fn defaults_for_missing_scale_and_transform() {
        let toml_src = r#"
            version = 1
            [[screens]]
            uid = "DP-1"
            active = true
            width = 1920
            height = 1080
            freq = 60.0
            x = 0
            y = 0
        "#;
        let p: Profile = toml::from_str(toml_src).unwrap();
        assert_eq!(p.screens[0].scale, 1.0);
        assert_eq!(p.screens[0].transform, 0);
    }
}
