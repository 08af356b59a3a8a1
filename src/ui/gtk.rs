//! GTK4 editor window that runs on the **main thread**.
//!
//! # Widget tree
//!
//! ```text
//! window
//! └ .editor                   (vertical box)
//!     ├ .toolbar              (Apply, On/Off, mode, profiles)
//!     ├ GtkDrawingArea        (the screens, drawn with cairo)
//!     └ .status               (status line, `.error` on failures)
//! ```
//!
//! Toolkit input is translated into [`InputEvent`]s and queued on the
//! session; a GLib timer calls [`EditorSession::tick`] every `tick_ms` and
//! redraws.  Pointer coordinates are flipped so the session sees a y-up
//! viewport with its origin in the bottom-left corner.

use crate::editor::{EditorSession, EditorState};
use crate::event::{Action, InputEvent, Key};
use crate::traits::{CommandRunner, ProfileStore};
use gtk4::prelude::*;
use gtk4::{cairo, gdk, glib};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Error from setting up the editor window.
#[derive(Debug, thiserror::Error)]
#[error("ui error: {0}")]
pub struct UiError(String);

const DEFAULT_CSS: &str = r#"
.toolbar {
    padding: 6px;
}

.status {
    padding: 4px 8px;
}

.status.error {
    color: #e06c75;
}
"#;

const BACKGROUND: (f64, f64, f64) = (0.12, 0.12, 0.14);

type Shared<R, S> = Rc<RefCell<EditorSession<R, S>>>;

fn push<R: CommandRunner, S: ProfileStore>(session: &Shared<R, S>, event: impl Into<InputEvent>) {
    session.borrow_mut().push(event);
}

//  Drawing

fn draw<R: CommandRunner, S: ProfileStore>(
    session: &EditorSession<R, S>,
    cr: &cairo::Context,
    height: f64,
) -> Result<(), cairo::Error> {
    cr.set_source_rgb(BACKGROUND.0, BACKGROUND.1, BACKGROUND.2);
    cr.paint()?;
    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
    cr.set_font_size(13.0);

    for gs in session.layout().screens() {
        let r = gs.rect;
        // Editor space is y-up.
        let top = height - r.top();
        let (red, green, blue) = gs.color;
        let alpha = if gs.screen.active { 1.0 } else { 0.35 };
        cr.set_source_rgba(
            red as f64 / 255.0,
            green as f64 / 255.0,
            blue as f64 / 255.0,
            alpha,
        );
        cr.rectangle(r.x, top, r.width, r.height);
        cr.fill()?;

        if session.selected() == Some(gs.screen.uid.as_str()) {
            cr.set_source_rgb(1.0, 1.0, 1.0);
            cr.set_line_width(3.0);
            cr.rectangle(r.x + 1.5, top + 1.5, r.width - 3.0, r.height - 3.0);
            cr.stroke()?;
        }

        let label = match gs.screen.mode {
            Some(m) if gs.screen.active => format!("{} {}x{}", gs.screen.uid, m.width, m.height),
            _ => format!("{} (off)", gs.screen.uid),
        };
        let extents = cr.text_extents(&label)?;
        cr.set_source_rgb(0.05, 0.05, 0.05);
        cr.move_to(
            r.x + (r.width - extents.width()) / 2.0,
            top + (r.height + extents.height()) / 2.0,
        );
        cr.show_text(&label)?;
    }
    Ok(())
}

//  Toolbar helpers

fn mode_labels(resolutions: &[(u32, u32)], freqs: impl Fn(u32, u32) -> Vec<f64>) -> Vec<(String, Action)> {
    let mut out = Vec::new();
    for &(width, height) in resolutions {
        for freq in freqs(width, height) {
            out.push((
                format!("{}x{} @ {:.2} Hz", width, height, freq),
                Action::SetMode {
                    width,
                    height,
                    freq,
                },
            ));
        }
    }
    out
}

fn set_strings(dropdown: &gtk4::DropDown, items: &[String]) {
    let refs: Vec<&str> = items.iter().map(String::as_str).collect();
    dropdown.set_model(Some(&gtk4::StringList::new(&refs)));
}

fn key_from_gdk(keyval: gdk::Key) -> Option<Key> {
    match keyval {
        gdk::Key::Return | gdk::Key::KP_Enter => Some(Key::Return),
        gdk::Key::Escape => Some(Key::Escape),
        gdk::Key::BackSpace => Some(Key::Backspace),
        _ => keyval.to_unicode().filter(|c| !c.is_control()).map(Key::Char),
    }
}

//  Public API

/// Open the editor window and run the GLib main loop on the **current**
/// (main) thread until the window is closed.
pub fn run_editor<R, S>(session: EditorSession<R, S>) -> Result<(), UiError>
where
    R: CommandRunner + 'static,
    S: ProfileStore + 'static,
{
    gtk4::init().map_err(|e| UiError(format!("failed to initialise GTK4: {}", e)))?;
    info!("GTK4 initialised on main thread");
    load_css();

    let editor_cfg = session.context().editor.clone();
    let session: Shared<R, S> = Rc::new(RefCell::new(session));

    let window = gtk4::Window::new();
    window.set_title(Some("monlay"));
    window.set_default_size(editor_cfg.window_width, editor_cfg.window_height);

    let root = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    root.add_css_class("editor");
    window.set_child(Some(&root));

    //  Toolbar
    let toolbar = gtk4::Box::new(gtk4::Orientation::Horizontal, 6);
    toolbar.add_css_class("toolbar");
    root.append(&toolbar);

    let apply = gtk4::Button::with_label("Apply");
    let power = gtk4::Button::with_label("On/Off");
    let modes = gtk4::DropDown::from_strings(&[]);
    let set_mode = gtk4::Button::with_label("Set mode");
    let profiles = gtk4::DropDown::from_strings(&[]);
    let load = gtk4::Button::with_label("Load");
    let save = gtk4::Button::with_label("Save");
    let save_new = gtk4::Button::with_label("Save new…");
    let reload = gtk4::Button::with_label("Reload");
    for w in [
        apply.upcast_ref::<gtk4::Widget>(),
        power.upcast_ref(),
        modes.upcast_ref(),
        set_mode.upcast_ref(),
        profiles.upcast_ref(),
        load.upcast_ref(),
        save.upcast_ref(),
        save_new.upcast_ref(),
        reload.upcast_ref(),
    ] {
        toolbar.append(w);
    }

    let mode_actions: Rc<RefCell<Vec<Action>>> = Rc::default();
    let profile_names: Rc<RefCell<Vec<String>>> = Rc::default();

    for (button, action) in [
        (&apply, Action::Apply),
        (&power, Action::TogglePower),
        (&save_new, Action::SaveNewProfile),
        (&reload, Action::ReloadProfiles),
    ] {
        let session = session.clone();
        button.connect_clicked(move |_| push(&session, action.clone()));
    }
    {
        let session = session.clone();
        let modes = modes.clone();
        let mode_actions = mode_actions.clone();
        set_mode.connect_clicked(move |_| {
            if let Some(action) = mode_actions.borrow().get(modes.selected() as usize) {
                push(&session, action.clone());
            }
        });
    }
    for (button, load_it) in [(&load, true), (&save, false)] {
        let session = session.clone();
        let profiles = profiles.clone();
        let profile_names = profile_names.clone();
        button.connect_clicked(move |_| {
            let Some(name) = profile_names.borrow().get(profiles.selected() as usize).cloned() else {
                warn!("no profile selected");
                return;
            };
            let action = if load_it {
                Action::LoadProfile(name)
            } else {
                Action::SaveProfile(name)
            };
            push(&session, action);
        });
    }

    //  Canvas
    let area = gtk4::DrawingArea::new();
    area.set_hexpand(true);
    area.set_vexpand(true);
    area.set_focusable(true);
    root.append(&area);

    {
        let session = session.clone();
        area.set_draw_func(move |_, cr, _width, height| {
            if let Err(e) = draw(&session.borrow(), cr, height as f64) {
                warn!("draw failed: {}", e);
            }
        });
    }
    {
        let session = session.clone();
        area.connect_resize(move |_, width, height| {
            push(
                &session,
                InputEvent::Resize {
                    width: width as f64,
                    height: height as f64,
                },
            );
        });
    }

    let click = gtk4::GestureClick::new();
    click.set_button(0);
    {
        let session = session.clone();
        let area = area.clone();
        click.connect_pressed(move |gesture, _, x, y| {
            area.grab_focus();
            let y = area.height() as f64 - y;
            push(
                &session,
                InputEvent::PointerPress {
                    x,
                    y,
                    button: gesture.current_button(),
                },
            );
        });
    }
    {
        let session = session.clone();
        let area = area.clone();
        click.connect_released(move |gesture, _, x, y| {
            let y = area.height() as f64 - y;
            push(
                &session,
                InputEvent::PointerRelease {
                    x,
                    y,
                    button: gesture.current_button(),
                },
            );
        });
    }
    area.add_controller(click);

    let motion = gtk4::EventControllerMotion::new();
    {
        let session = session.clone();
        let area = area.clone();
        motion.connect_motion(move |_, x, y| {
            let y = area.height() as f64 - y;
            push(&session, InputEvent::PointerMotion { x, y });
        });
    }
    area.add_controller(motion);

    let keys = gtk4::EventControllerKey::new();
    {
        let session = session.clone();
        keys.connect_key_pressed(move |_, keyval, _, _| match key_from_gdk(keyval) {
            Some(key) => {
                push(&session, key);
                glib::Propagation::Stop
            }
            None => glib::Propagation::Proceed,
        });
    }
    window.add_controller(keys);

    //  Status line
    let status = gtk4::Label::new(None);
    status.add_css_class("status");
    status.set_xalign(0.0);
    root.append(&status);

    //  Main loop
    let main_loop = glib::MainLoop::new(None, false);
    {
        let main_loop = main_loop.clone();
        window.connect_close_request(move |_| {
            info!("editor window closed");
            main_loop.quit();
            glib::Propagation::Proceed
        });
    }
    window.present();

    let mut shown_selection: Option<Option<String>> = None;
    let mut shown_profiles: Option<Vec<String>> = None;
    glib::timeout_add_local(Duration::from_millis(editor_cfg.tick_ms), move || {
        let mut s = session.borrow_mut();
        s.tick();

        let selection = s.selected().map(str::to_owned);
        if shown_selection.as_ref() != Some(&selection) {
            let entries = mode_labels(&s.selected_resolutions(), |w, h| s.selected_frequencies(w, h));
            debug!("{} mode(s) for {:?}", entries.len(), selection);
            let (labels, actions): (Vec<String>, Vec<Action>) = entries.into_iter().unzip();
            set_strings(&modes, &labels);
            *mode_actions.borrow_mut() = actions;
            shown_selection = Some(selection);
        }

        let names: Vec<String> = s.profiles().keys().cloned().collect();
        if shown_profiles.as_ref() != Some(&names) {
            set_strings(&profiles, &names);
            *profile_names.borrow_mut() = names.clone();
            shown_profiles = Some(names);
        }

        let idle = *s.state() == EditorState::Idle;
        for w in [&power, &set_mode, &load, &save, &save_new, &reload] {
            w.set_sensitive(idle);
        }
        apply.set_sensitive(idle && !s.layout().is_empty());

        status.set_text(&s.status_text());
        if s.status().is_some_and(|m| m.is_error) {
            status.add_css_class("error");
        } else {
            status.remove_css_class("error");
        }
        drop(s);

        area.queue_draw();
        glib::ControlFlow::Continue
    });

    info!("entering GLib main loop");
    main_loop.run();
    info!("GLib main loop exited");
    Ok(())
}

//  CSS loading

fn load_css() {
    let provider = gtk4::CssProvider::new();
    #[allow(deprecated)]
    provider.load_from_data(DEFAULT_CSS);

    if let Some(display) = gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    } else {
        warn!("no GDK display, CSS will not be applied");
    }
}
