//! **monlay**: an interactive multi-monitor layout editor.
//!
//! Screens are shown as scaled-down rectangles that can be dragged around.
//! On release a dragged screen snaps against the screen it overlaps, and the
//! whole arrangement is re-centred.  Applying the layout turns it back into
//! a single `wlr-randr`, `xrandr` or `hyprctl --batch` command.  Named
//! profiles store complete arrangements for later reuse.
//!
//! # Architecture
//!
//! The pure core ([`geometry`], [`snap`], [`layout`], [`animation`],
//! [`command`], [`profile`]) knows nothing about display servers.  The
//! [`editor::EditorSession`] state machine drives it from queued
//! [`event::InputEvent`]s and talks to the outside world only through the
//! traits in [`traits`]:
//!
//! * [`traits::ScreenLoader`]: implemented in [`hyprland`] (Hyprland IPC)
//!   and [`randr`] (`wlr-randr` / `xrandr` output),
//! * [`traits::CommandRunner`]: implemented in [`runner`],
//! * [`traits::ProfileStore`]: implemented in [`store`].
//!
//! The GTK4 window in [`ui`] is optional (feature `editor-gtk`).

pub mod animation;
pub mod command;
pub mod config;
pub mod editor;
pub mod event;
pub mod geometry;
pub mod hyprland;
pub mod layout;
pub mod profile;
pub mod randr;
pub mod runner;
pub mod screen;
pub mod snap;
pub mod store;
pub mod traits;
pub mod ui;
