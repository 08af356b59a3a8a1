//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/monlay/config.json`.
//! Every section is optional and falls back to compiled-in defaults, so a
//! minimal `{}` file is valid.
//!
//! # Example
//!
//! ```json
//! {
//!   "backend": "hyprland",
//!   "profiles_path": "/home/me/.config/monlay/profiles.toml",
//!   "editor": {
//!     "ui_ratio": 8.0,
//!     "tick_ms": 33,
//!     "status_ticks": 200,
//!     "confirm_ticks": 450,
//!     "window_width": 1024,
//!     "window_height": 768
//!   }
//! }
//! ```

use crate::command::Backend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Force a backend instead of detecting it from the environment.
    #[serde(default)]
    pub backend: Option<Backend>,

    /// Where profiles are stored.  Defaults to `profiles.toml` next to the
    /// config file.
    #[serde(default)]
    pub profiles_path: Option<PathBuf>,

    /// Editor geometry and timing.
    #[serde(default)]
    pub editor: EditorConfig,
}

/// Editor geometry and timing.
///
/// Durations are counted in frame ticks of `tick_ms` milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Real pixels per editor unit.
    pub ui_ratio: f64,
    /// Frame period (ms).
    pub tick_ms: u64,
    /// How long a status message stays visible (ticks).
    pub status_ticks: u32,
    /// How long the user has to confirm an applied layout before it is
    /// reverted (ticks).  `0` disables the confirmation step.
    pub confirm_ticks: u32,
    /// Initial editor window width.
    pub window_width: i32,
    /// Initial editor window height.
    pub window_height: i32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            ui_ratio: 8.0,
            tick_ms: 33,
            status_ticks: 200,
            confirm_ticks: 450,
            window_width: 1024,
            window_height: 768,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        if config.editor.ui_ratio <= 0.0 {
            return Err(ConfigError(format!(
                "{}: ui_ratio must be positive",
                path.display()
            )));
        }
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

/// Shared, read-only state handed to the components that need it.
///
/// Built once at start-up from the [`Config`] and the detected backend.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub backend: Backend,
    pub editor: EditorConfig,
}

impl AppContext {
    pub fn new(backend: Backend, editor: EditorConfig) -> Self {
        Self { backend, editor }
    }

    /// Resolve the backend from `config`, detecting it when not forced.
    pub fn from_config(config: &Config) -> Self {
        let backend = config.backend.unwrap_or_else(Backend::detect);
        Self::new(backend, config.editor.clone())
    }

    pub fn ui_ratio(&self) -> f64 {
        self.editor.ui_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "backend": "xrandr",
            "profiles_path": "/tmp/p.toml",
            "editor": {
                "ui_ratio": 10.0,
                "tick_ms": 16,
                "status_ticks": 100,
                "confirm_ticks": 0,
                "window_width": 800,
                "window_height": 600
            }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.backend, Some(Backend::Xrandr));
        assert_eq!(cfg.profiles_path, Some(PathBuf::from("/tmp/p.toml")));
        assert_eq!(cfg.editor.ui_ratio, 10.0);
        assert_eq!(cfg.editor.tick_ms, 16);
        assert_eq!(cfg.editor.status_ticks, 100);
        assert_eq!(cfg.editor.confirm_ticks, 0);
        assert_eq!(cfg.editor.window_width, 800);
        assert_eq!(cfg.editor.window_height, 600);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert!(cfg.backend.is_none());
        assert!(cfg.profiles_path.is_none());
        let d = EditorConfig::default();
        assert_eq!(cfg.editor.ui_ratio, d.ui_ratio);
        assert_eq!(cfg.editor.tick_ms, d.tick_ms);
        assert_eq!(cfg.editor.status_ticks, d.status_ticks);
        assert_eq!(cfg.editor.confirm_ticks, d.confirm_ticks);
    }

    #[test]
    fn deserialize_partial_editor() {
        let json = r#"{ "editor": { "ui_ratio": 4.0 } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.editor.ui_ratio, 4.0);
        assert_eq!(cfg.editor.tick_ms, EditorConfig::default().tick_ms);
    }

    #[test]
    fn invalid_backend_is_rejected() {
        let json = r#"{ "backend": "mutter" }"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "editor": {}, "future_section": { "key": 42 } }"#;
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn load_rejects_non_positive_ratio() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "editor": {{ "ui_ratio": 0 }} }}"#).unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn context_prefers_forced_backend() {
        let cfg = Config {
            backend: Some(Backend::Hyprland),
            ..Config::default()
        };
        let ctx = AppContext::from_config(&cfg);
        assert_eq!(ctx.backend, Backend::Hyprland);
        assert_eq!(ctx.ui_ratio(), 8.0);
    }
}
