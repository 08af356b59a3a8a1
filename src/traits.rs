//! Traits that decouple the editor from the outside world.
//!
//! The [`EditorSession`](crate::editor::EditorSession) never reads display
//! server output, spawns processes or touches the filesystem directly.  It
//! talks to three collaborators instead:
//!
//! * [`ScreenLoader`]: where the current screens come from,
//! * [`CommandRunner`]: how a synthesized command is executed,
//! * [`ProfileStore`]: where named profiles are kept.
//!
//! Concrete implementations live in [`hyprland`](crate::hyprland),
//! [`randr`](crate::randr), [`runner`](crate::runner) and
//! [`store`](crate::store).

use crate::profile::Profile;
use crate::screen::Screen;
use std::collections::BTreeMap;

/// Source of the current screen configuration.
pub trait ScreenLoader {
    /// The error type produced by this loader.
    type Error: std::error::Error + Send + 'static;

    /// Return every known output, connected or not, each with a non-empty
    /// list of available modes.
    fn load(&self) -> Result<Vec<Screen>, Self::Error>;
}

/// Executes a synthesized display-server command.
pub trait CommandRunner {
    /// The error type produced by this runner.
    type Error: std::error::Error + Send + 'static;

    /// Run `command`.  A non-zero exit status is an error.
    fn run(&self, command: &str) -> Result<(), Self::Error>;
}

/// Persistent storage for named profiles.
pub trait ProfileStore {
    /// The error type produced by this store.
    type Error: std::error::Error + Send + 'static;

    /// Return every stored profile, keyed by name.  A store that has never
    /// been written to is empty, not an error.
    fn load_profiles(&self) -> Result<BTreeMap<String, Profile>, Self::Error>;

    /// Insert or replace the profile called `name`.
    fn save_profile(&self, name: &str, profile: &Profile) -> Result<(), Self::Error>;
}


#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;
    use crate::screen::Mode;

    #[test]
    fn mock_runner_records_commands() {
        let runner = MockRunner::default();
        runner.run("wlr-randr --output DP-1 --off").unwrap();
        assert_eq!(runner.log.borrow().len(), 1);
        let failing = MockRunner {
            fail: true,
            ..MockRunner::default()
        };
        assert!(failing.run("xrandr").is_err());
        assert_eq!(failing.log.borrow()[0], "xrandr");
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::default();
        assert!(store.load_profiles().unwrap().is_empty());
        let p = Profile {
            version: 1,
            screens: vec![],
        };
        store.save_profile("work", &p).unwrap();
        store.save_profile("work", &p).unwrap();
        let all = store.load_profiles().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all["work"], p);
    }

    #[test]
    fn fixed_loader_returns_screens() {
        let mode = Mode::new(1920, 1080, 60.0);
        let loader = FixedLoader(vec![Screen::new("DP-1", "x", vec![mode])]);
        let screens = loader.load().unwrap();
        assert_eq!(screens.len(), 1);
        assert_eq!(screens[0].available, vec![mode]);
    }
}
