//! Hyprland-specific implementations.
//!
//! This module provides the [`ScreenLoader`](crate::traits::ScreenLoader)
//! used when running under Hyprland, powered by Hyprland's IPC socket.
//! Applying a layout goes through `hyprctl --batch` like every other
//! backend command, so nothing here writes to the compositor.
//!
//! Nothing outside this module should reference Hyprland IPC directly.

pub mod monitors;

pub use monitors::{HyprlandError, HyprlandLoader};
