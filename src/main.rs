//! Entry point for the **monlay** layout editor.
//!
//! ```text
//! monlay                  open the editor (feature `editor-gtk`)
//! monlay --print          print the screens and the command for the current layout
//! monlay --list-profiles  list saved profiles
//! monlay --load <name>    apply a saved profile without opening the editor
//! monlay --dry-run        log commands instead of running them
//! ```

use monlay::command::{synthesize_layout, Backend};
use monlay::config::{AppContext, Config};
use monlay::hyprland::HyprlandLoader;
use monlay::layout::{ColorSequence, Layout};
use monlay::randr::RandrLoader;
use monlay::runner::ShellRunner;
use monlay::screen::Screen;
use monlay::store::TomlProfileStore;
use monlay::traits::{CommandRunner, ProfileStore, ScreenLoader};
use log::{error, info};
use std::path::PathBuf;

/// Resolve the config directory (`$XDG_CONFIG_HOME/monlay`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("monlay")
}

/// Try to load the config from `$XDG_CONFIG_HOME/monlay/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn profiles_path(config: &Config) -> PathBuf {
    config
        .profiles_path
        .clone()
        .unwrap_or_else(|| config_dir().join("profiles.toml"))
}

/// Query the display server for the current screens.
fn load_screens(backend: Backend) -> Result<Vec<Screen>, String> {
    let screens = match RandrLoader::new(backend) {
        Some(loader) => loader.load().map_err(|e| e.to_string())?,
        None => HyprlandLoader::new().load().map_err(|e| e.to_string())?,
    };
    if screens.is_empty() {
        return Err(format!("{} reported no screens", backend));
    }
    info!("found {} screen(s) via {}", screens.len(), backend);
    Ok(screens)
}

//  Command-line parsing

#[derive(Debug, Default)]
struct Args {
    print: bool,
    list_profiles: bool,
    load: Option<String>,
    dry_run: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--print" => parsed.print = true,
            "--list-profiles" => parsed.list_profiles = true,
            "--dry-run" => parsed.dry_run = true,
            "--load" => {
                parsed.load = Some(args.next().ok_or("--load requires a profile name")?);
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(parsed)
}

//  Main

fn main() {
    env_logger::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("monlay: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(args) {
        error!("{}", e);
        eprintln!("monlay: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    let config = load_config();
    let ctx = AppContext::from_config(&config);
    let store = TomlProfileStore::new(profiles_path(&config));
    let runner = ShellRunner::new(args.dry_run);
    info!("backend: {}", ctx.backend);

    if args.list_profiles {
        let profiles = store.load_profiles().map_err(|e| e.to_string())?;
        for name in profiles.keys() {
            println!("{}", name);
        }
        return Ok(());
    }

    let screens = load_screens(ctx.backend)?;

    if args.print {
        for screen in &screens {
            println!("{}", screen);
        }
        let layout = Layout::from_screens(screens, ctx.ui_ratio(), &mut ColorSequence::new());
        println!("{}", synthesize_layout(ctx.backend, &layout, ctx.ui_ratio()));
        return Ok(());
    }

    if let Some(name) = args.load {
        return load_profile(&ctx, screens, &store, &runner, &name);
    }

    run_editor(ctx, screens, runner, store)
}

/// Apply the stored profile `name` without opening the editor.
fn load_profile(
    ctx: &AppContext,
    screens: Vec<Screen>,
    store: &TomlProfileStore,
    runner: &ShellRunner,
    name: &str,
) -> Result<(), String> {
    let profiles = store.load_profiles().map_err(|e| e.to_string())?;
    let profile = profiles
        .get(name)
        .ok_or_else(|| format!("no profile named {:?} in {}", name, store.path().display()))?;
    let mut layout = Layout::from_screens(screens, ctx.ui_ratio(), &mut ColorSequence::new());
    profile.apply(&mut layout, ctx.ui_ratio()).map_err(|e| e.to_string())?;
    let command = synthesize_layout(ctx.backend, &layout, ctx.ui_ratio());
    info!("applying profile {:?}: {}", name, command);
    runner.run(&command).map_err(|e| e.to_string())
}

//  Editor

#[cfg(feature = "editor-gtk")]
fn run_editor(
    ctx: AppContext,
    screens: Vec<Screen>,
    runner: ShellRunner,
    store: TomlProfileStore,
) -> Result<(), String> {
    let session = monlay::editor::EditorSession::new(ctx, screens, runner, store);
    monlay::ui::gtk::run_editor(session).map_err(|e| e.to_string())
}

#[cfg(not(feature = "editor-gtk"))]
fn run_editor(
    _ctx: AppContext,
    _screens: Vec<Screen>,
    _runner: ShellRunner,
    _store: TomlProfileStore,
) -> Result<(), String> {
    Err("the editor requires the `editor-gtk` feature; use --print, --list-profiles or --load".into())
}
