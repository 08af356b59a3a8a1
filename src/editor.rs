//! The editor session: layout, selection and input state machine.
//!
//! [`EditorSession`] owns the [`Layout`] and reacts to queued
//! [`InputEvent`]s once per frame [`tick`](EditorSession::tick).  It is
//! generic over a [`CommandRunner`] and a [`ProfileStore`], so it can be
//! driven by the GTK front-end, the CLI or a test harness alike.
//!
//! # States
//!
//! ```text
//! Idle ──press on screen──▶ Dragging ──release (snap + center)──▶ Idle
//! Idle ──save new profile─▶ TextEntry ──Return / Escape─────────▶ Idle
//! Idle ──apply (success)──▶ ConfirmationCountdown ──confirm / revert / timeout──▶ Idle
//! ```
//!
//! Drags can only start from `Idle`, so nothing moves while a name is being
//! typed or an applied layout waits for confirmation.

use crate::command::synthesize_layout;
use crate::config::AppContext;
use crate::event::{Action, InputEvent, Key};
use crate::layout::{ColorSequence, Layout};
use crate::profile::{Profile, ProfileError};
use crate::screen::{find_matching_mode, sorted_frequencies, sorted_resolutions, Screen};
use crate::traits::{CommandRunner, ProfileStore};
use log::{debug, error, info, warn};
use std::collections::{BTreeMap, VecDeque};

/// Possible errors from the editor.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The display-server command failed.
    #[error("failed to apply layout: {0}")]
    Runner(String),
    /// The profile store failed.
    #[error("profile store error: {0}")]
    Store(String),
    /// A profile could not be applied.
    #[error(transparent)]
    Profile(#[from] ProfileError),
    /// No profile with this name exists.
    #[error("no profile named {0:?}")]
    UnknownProfile(String),
    /// A profile name is required.
    #[error("profile name is empty")]
    EmptyProfileName,
    /// The selected screen does not support the requested mode.
    #[error("mode {width}x{height}@{freq}Hz not available on {uid}")]
    ModeNotFound {
        uid: String,
        width: u32,
        height: u32,
        freq: f64,
    },
}

/// Where the editor is in its interaction cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    Idle,
    /// A screen follows the pointer.  `last` is the previous pointer
    /// position in editor space.
    Dragging { uid: String, last: (f64, f64) },
    /// A profile name is being typed.
    TextEntry { buffer: String },
    /// A layout was applied and waits for confirmation.
    ConfirmationCountdown { ticks_left: u32 },
}

/// A transient message shown in the status line.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    ticks_left: u32,
}

/// An interactive editing session over one set of screens.
pub struct EditorSession<R: CommandRunner, S: ProfileStore> {
    ctx: AppContext,
    runner: R,
    store: S,
    layout: Layout,
    /// Arrangement that is known to be applied; restored on revert.
    baseline: Layout,
    colors: ColorSequence,
    viewport: (f64, f64),
    selected: Option<String>,
    state: EditorState,
    queue: VecDeque<InputEvent>,
    status: Option<StatusMessage>,
    profiles: BTreeMap<String, Profile>,
}

impl<R: CommandRunner, S: ProfileStore> EditorSession<R, S> {
    /// Create a session for `screens`, centered in the configured window
    /// size.
    pub fn new(ctx: AppContext, screens: Vec<Screen>, runner: R, store: S) -> Self {
        let viewport = (
            ctx.editor.window_width as f64,
            ctx.editor.window_height as f64,
        );
        let mut session = Self {
            ctx,
            runner,
            store,
            layout: Layout::default(),
            baseline: Layout::default(),
            colors: ColorSequence::new(),
            viewport,
            selected: None,
            state: EditorState::Idle,
            queue: VecDeque::new(),
            status: None,
            profiles: BTreeMap::new(),
        };
        session.reload(screens);
        if let Err(e) = session.sync_profiles() {
            warn!("could not read profiles: {}", e);
        }
        session
    }

    /// Replace every screen, discarding selection and any in-flight
    /// interaction.
    pub fn reload(&mut self, screens: Vec<Screen>) {
        info!("loading {} screen(s)", screens.len());
        self.colors = ColorSequence::new();
        self.layout = Layout::from_screens(screens, self.ctx.ui_ratio(), &mut self.colors);
        self.layout.center(self.viewport, true);
        self.baseline = self.layout.clone();
        self.selected = None;
        self.state = EditorState::Idle;
        self.queue.clear();
    }

    //  Accessors

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn viewport(&self) -> (f64, f64) {
        self.viewport
    }

    /// Uid of the selected screen.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_screen(&self) -> Option<&Screen> {
        self.layout.get(self.selected.as_deref()?).map(|gs| &gs.screen)
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn profiles(&self) -> &BTreeMap<String, Profile> {
        &self.profiles
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The profile name typed so far, while in text entry.
    pub fn text_input(&self) -> Option<&str> {
        match &self.state {
            EditorState::TextEntry { buffer } => Some(buffer),
            _ => None,
        }
    }

    /// Text for the status line: a pending message, otherwise a hint based
    /// on the current state.
    pub fn status_text(&self) -> String {
        if let Some(status) = &self.status {
            return status.text.clone();
        }
        match &self.state {
            EditorState::TextEntry { buffer } => format!("Profile name: {}", buffer),
            EditorState::ConfirmationCountdown { ticks_left } => {
                let secs = (*ticks_left as u64 * self.ctx.editor.tick_ms).div_ceil(1000);
                format!("Keep this layout? Reverting in {}s (Return keeps, Escape reverts)", secs)
            }
            _ => match self.selected_screen() {
                Some(screen) => screen.short_name(),
                None => "Select a monitor".to_string(),
            },
        }
    }

    /// Resolutions offered for the selected screen, largest first.
    pub fn selected_resolutions(&self) -> Vec<(u32, u32)> {
        self.selected_screen()
            .map(|s| sorted_resolutions(&s.available))
            .unwrap_or_default()
    }

    /// Refresh rates offered for the selected screen at `width`×`height`.
    pub fn selected_frequencies(&self, width: u32, height: u32) -> Vec<f64> {
        self.selected_screen()
            .map(|s| sorted_frequencies(&s.available, width, height))
            .unwrap_or_default()
    }

    /// The command that [`Action::Apply`] would run right now.
    pub fn command(&self) -> String {
        synthesize_layout(self.ctx.backend, &self.layout, self.ctx.ui_ratio())
    }

    //  Event processing

    /// Queue an event for the next [`tick`](Self::tick).
    pub fn push(&mut self, event: impl Into<InputEvent>) {
        self.queue.push_back(event.into());
    }

    /// Process one frame: drain the event queue, advance the animation and
    /// the timers.
    ///
    /// Errors from individual events are shown in the status line and do not
    /// stop the remaining events from being processed.
    pub fn tick(&mut self) {
        while let Some(event) = self.queue.pop_front() {
            if let Err(e) = self.handle(event) {
                error!("{}", e);
                self.set_status(e.to_string(), true);
            }
        }

        self.layout.step_animation();

        if let Some(status) = &mut self.status {
            status.ticks_left = status.ticks_left.saturating_sub(1);
            if status.ticks_left == 0 {
                self.status = None;
            }
        }

        if let EditorState::ConfirmationCountdown { ticks_left } = &mut self.state {
            *ticks_left = ticks_left.saturating_sub(1);
            if *ticks_left == 0 {
                info!("confirmation timed out");
                if let Err(e) = self.revert() {
                    error!("{}", e);
                    self.set_status(e.to_string(), true);
                }
            }
        }
    }

    /// Process a single event immediately.
    pub fn handle(&mut self, event: InputEvent) -> Result<(), EditorError> {
        match event {
            InputEvent::PointerPress { x, y, button } => {
                if self.state != EditorState::Idle {
                    debug!("press ignored in state {:?}", self.state);
                    return Ok(());
                }
                let Some(uid) = self.layout.hit_test(x, y).map(str::to_owned) else {
                    return Ok(());
                };
                debug!("select {} (button {})", uid, button);
                self.layout.bring_to_front(&uid);
                self.selected = Some(uid.clone());
                self.state = EditorState::Dragging { uid, last: (x, y) };
            }

            InputEvent::PointerMotion { x, y } => {
                if let EditorState::Dragging { uid, last } = &mut self.state {
                    let (dx, dy) = (x - last.0, y - last.1);
                    *last = (x, y);
                    if let Some(gs) = self.layout.get_mut(uid) {
                        gs.move_by(dx, dy);
                    }
                }
            }

            InputEvent::PointerRelease { x, y, .. } => {
                if matches!(self.state, EditorState::Dragging { .. }) {
                    self.handle(InputEvent::PointerMotion { x, y })?;
                    self.state = EditorState::Idle;
                    self.layout.snap_front();
                    self.layout.center(self.viewport, false);
                }
            }

            InputEvent::Resize { width, height } => {
                debug!("resize {}x{}", width, height);
                self.viewport = (width, height);
                self.layout.center(self.viewport, true);
            }

            InputEvent::Key(key) => self.handle_key(key)?,

            InputEvent::Action(action) => self.handle_action(action)?,
        }
        Ok(())
    }

    fn handle_key(&mut self, key: Key) -> Result<(), EditorError> {
        if let EditorState::TextEntry { buffer } = &mut self.state {
            match key {
                Key::Char(c) if !c.is_control() => buffer.push(c),
                Key::Char(_) => {}
                Key::Backspace => {
                    buffer.pop();
                }
                Key::Escape => {
                    debug!("profile naming cancelled");
                    self.state = EditorState::Idle;
                }
                Key::Return => {
                    let name = buffer.trim().to_string();
                    self.state = EditorState::Idle;
                    if name.is_empty() {
                        return Err(EditorError::EmptyProfileName);
                    }
                    self.save_profile(&name)?;
                }
            }
            return Ok(());
        }

        let confirming = matches!(self.state, EditorState::ConfirmationCountdown { .. });
        match key {
            Key::Return if confirming => self.handle_action(Action::Confirm),
            Key::Escape if confirming => self.handle_action(Action::Revert),
            Key::Return if self.state == EditorState::Idle => self.handle_action(Action::Apply),
            _ => Ok(()),
        }
    }

    fn handle_action(&mut self, action: Action) -> Result<(), EditorError> {
        let confirming = matches!(self.state, EditorState::ConfirmationCountdown { .. });
        match action {
            Action::Confirm if confirming => {
                info!("layout confirmed");
                self.baseline = self.layout.clone();
                self.state = EditorState::Idle;
                self.set_status("Layout kept", false);
            }
            Action::Revert if confirming => self.revert()?,
            action if self.state == EditorState::Idle => self.handle_idle_action(action)?,
            action => debug!("action {:?} ignored in state {:?}", action, self.state),
        }
        Ok(())
    }

    fn handle_idle_action(&mut self, action: Action) -> Result<(), EditorError> {
        match action {
            Action::Apply => self.apply()?,

            Action::TogglePower => {
                let ratio = self.ctx.ui_ratio();
                let Some(gs) = self.selected.as_deref().and_then(|uid| self.layout.get_mut(uid)) else {
                    return Ok(());
                };
                let screen = &mut gs.screen;
                screen.active = !screen.active;
                if screen.active && screen.mode.is_none() {
                    screen.mode = screen.display_mode();
                }
                info!("{} {}", screen.uid, if screen.active { "on" } else { "off" });
                gs.refresh_size(ratio);
                self.layout.center(self.viewport, false);
            }

            Action::SetMode {
                width,
                height,
                freq,
            } => {
                let ratio = self.ctx.ui_ratio();
                let Some(gs) = self.selected.as_deref().and_then(|uid| self.layout.get_mut(uid)) else {
                    return Ok(());
                };
                let mode = find_matching_mode(&gs.screen.available, width, height, freq).ok_or_else(|| {
                    EditorError::ModeNotFound {
                        uid: gs.screen.uid.clone(),
                        width,
                        height,
                        freq,
                    }
                })?;
                info!("{} -> {}", gs.screen.uid, mode);
                gs.screen.mode = Some(mode);
                gs.refresh_size(ratio);
                self.layout.center(self.viewport, false);
            }

            Action::SaveNewProfile => {
                // The prompt lives in the status line.
                self.status = None;
                self.state = EditorState::TextEntry {
                    buffer: String::new(),
                };
            }

            Action::SaveProfile(name) => {
                if !self.profiles.contains_key(&name) {
                    return Err(EditorError::UnknownProfile(name));
                }
                self.save_profile(&name)?;
            }

            Action::LoadProfile(name) => {
                let profile = self
                    .profiles
                    .get(&name)
                    .ok_or_else(|| EditorError::UnknownProfile(name.clone()))?;
                let n = profile.apply(&mut self.layout, self.ctx.ui_ratio())?;
                info!("loaded profile {:?} ({} screen(s) matched)", name, n);
                self.layout.center(self.viewport, false);
                self.set_status(format!("Loaded profile {}", name), false);
            }

            Action::ReloadProfiles => self.sync_profiles()?,

            Action::Confirm | Action::Revert => {
                debug!("nothing to confirm");
            }
        }
        Ok(())
    }

    //  Helpers

    fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error,
            ticks_left: self.ctx.editor.status_ticks.max(1),
        });
    }

    fn sync_profiles(&mut self) -> Result<(), EditorError> {
        self.profiles = self
            .store
            .load_profiles()
            .map_err(|e| EditorError::Store(e.to_string()))?;
        debug!("{} profile(s) available", self.profiles.len());
        Ok(())
    }

    fn save_profile(&mut self, name: &str) -> Result<(), EditorError> {
        let profile = Profile::from_layout(&self.layout, self.ctx.ui_ratio());
        self.store
            .save_profile(name, &profile)
            .map_err(|e| EditorError::Store(e.to_string()))?;
        info!("saved profile {:?}", name);
        self.sync_profiles()?;
        self.set_status(format!("Saved profile {}", name), false);
        Ok(())
    }

    /// Run the command for the current arrangement.  The layout is kept as
    /// is whether or not the command succeeds.
    fn apply(&mut self) -> Result<(), EditorError> {
        let command = self.command();
        info!("applying: {}", command);
        self.runner
            .run(&command)
            .map_err(|e| EditorError::Runner(e.to_string()))?;
        let ticks = self.ctx.editor.confirm_ticks;
        if ticks > 0 {
            self.state = EditorState::ConfirmationCountdown { ticks_left: ticks };
        } else {
            self.baseline = self.layout.clone();
            self.set_status("Layout applied", false);
        }
        Ok(())
    }

    /// Restore and re-apply the last confirmed arrangement.
    fn revert(&mut self) -> Result<(), EditorError> {
        info!("reverting layout");
        self.state = EditorState::Idle;
        self.layout = self.baseline.clone();
        self.layout.center(self.viewport, true);
        self.selected = self
            .selected
            .take()
            .filter(|uid| self.layout.get(uid).is_some());
        let command = self.command();
        self.runner
            .run(&command)
            .map_err(|e| EditorError::Runner(e.to_string()))?;
        self.set_status("Layout reverted", false);
        Ok(())
    }
}
