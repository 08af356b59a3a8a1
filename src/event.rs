//! Input vocabulary of the editor.
//!
//! A front-end (the GTK window, a test harness, …) translates whatever its
//! toolkit delivers into [`InputEvent`]s and queues them on the
//! [`EditorSession`](crate::editor::EditorSession).  Pointer coordinates are
//! in editor space: origin at the bottom-left of the viewport, y up.

/// A keyboard key the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character.
    Char(char),
    Backspace,
    Return,
    Escape,
}

/// A toolbar action.  Actions that concern "the selected screen" are no-ops
/// when nothing is selected.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Synthesize and run the command for the current arrangement.
    Apply,
    /// Keep an applied layout while a confirmation countdown is running.
    Confirm,
    /// Roll back an applied layout while a confirmation countdown is running.
    Revert,
    /// Enable or disable the selected screen.
    TogglePower,
    /// Switch the selected screen to this resolution and refresh rate.
    SetMode { width: u32, height: u32, freq: f64 },
    /// Start typing the name of a new profile.
    SaveNewProfile,
    /// Overwrite the profile called `name` with the current arrangement.
    SaveProfile(String),
    /// Load the profile called `name`.
    LoadProfile(String),
    /// Re-read the profile store.
    ReloadProfiles,
}

/// Everything that can happen to the editor between two frames.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMotion { x: f64, y: f64 },
    PointerPress { x: f64, y: f64, button: u32 },
    PointerRelease { x: f64, y: f64, button: u32 },
    Key(Key),
    /// The viewport changed size.
    Resize { width: f64, height: f64 },
    Action(Action),
}

impl From<Action> for InputEvent {
    fn from(action: Action) -> Self {
        InputEvent::Action(action)
    }
}

impl From<Key> for InputEvent {
    fn from(key: Key) -> Self {
        InputEvent::Key(key)
    }
}
