//! Editor front-ends.
//!
//! When the `editor-gtk` feature is enabled, [`gtk::run_editor`] opens a
//! window for an [`EditorSession`](crate::editor::EditorSession) and drives
//! it from the GLib main loop.

#[cfg(feature = "editor-gtk")]
pub mod gtk;
