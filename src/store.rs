//! [`ProfileStore`] backed by a TOML file.
//!
//! All profiles live in one file, one table per profile name:
//!
//! ```toml
//! [desk]
//! version = 1
//!
//! [[desk.screens]]
//! uid = "DP-1"
//! active = true
//! width = 1920
//! height = 1080
//! freq = 60.0
//! x = 0
//! y = 0
//! scale = 1.0
//! transform = 0
//! ```

use crate::profile::Profile;
use crate::traits::ProfileStore;
use log::debug;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Profiles stored in a single TOML file.
#[derive(Debug, Clone)]
pub struct TomlProfileStore {
    path: PathBuf,
}

/// Errors from reading or writing the profile file.
#[derive(Debug, thiserror::Error)]
#[error("profile store error: {0}")]
pub struct StoreError(String);

impl TomlProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for TomlProfileStore {
    type Error = StoreError;

    fn load_profiles(&self) -> Result<BTreeMap<String, Profile>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet", self.path.display());
                return Ok(BTreeMap::new());
            }
            Err(e) => {
                return Err(StoreError(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        toml::from_str(&contents)
            .map_err(|e| StoreError(format!("failed to parse {}: {}", self.path.display(), e)))
    }

    fn save_profile(&self, name: &str, profile: &Profile) -> Result<(), StoreError> {
        let mut profiles = self.load_profiles()?;
        profiles.insert(name.to_string(), profile.clone());

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| StoreError(format!("failed to create {}: {}", dir.display(), e)))?;
        }
        let contents = toml::to_string(&profiles)
            .map_err(|e| StoreError(format!("failed to serialize profiles: {}", e)))?;
        std::fs::write(&self.path, contents)
            .map_err(|e| StoreError(format!("failed to write {}: {}", self.path.display(), e)))?;
        debug!("wrote {} profile(s) to {}", profiles.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileScreen;

    fn profile(x: i32) -> Profile {
        Profile {
            version: 1,
            screens: vec![ProfileScreen {
                uid: "DP-1".into(),
                active: true,
                width: 1920,
                height: 1080,
                freq: 59.95,
                x,
                y: 0,
                scale: 1.25,
                transform: 3,
            }],
        }
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlProfileStore::new(dir.path().join("profiles.toml"));
        assert!(store.load_profiles().unwrap().is_empty());
    }

    #[test]
    fn save_creates_directory_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("profiles.toml");
        let store = TomlProfileStore::new(&path);
        store.save_profile("desk", &profile(0)).unwrap();
        store.save_profile("sofa", &profile(1920)).unwrap();
        assert!(path.exists());

        let reopened = TomlProfileStore::new(&path);
        let all = reopened.load_profiles().unwrap();
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["desk", "sofa"]);
        assert_eq!(all["desk"], profile(0));
        assert_eq!(all["sofa"].screens[0].x, 1920);
    }

    #[test]
    fn save_overwrites_existing_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlProfileStore::new(dir.path().join("profiles.toml"));
        store.save_profile("desk", &profile(0)).unwrap();
        store.save_profile("desk", &profile(640)).unwrap();
        let all = store.load_profiles().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all["desk"].screens[0].x, 640);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        let err = TomlProfileStore::new(&path).load_profiles().unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn hand_written_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.toml");
        std::fs::write(
            &path,
            "[tv]\n[[tv.screens]]\nuid = \"HDMI-A-1\"\nactive = false\nwidth = 3840\nheight = 2160\nfreq = 30.0\nx = 0\ny = 0\n",
        )
        .unwrap();
        let all = TomlProfileStore::new(&path).load_profiles().unwrap();
        assert_eq!(all["tv"].version, 1);
        assert_eq!(all["tv"].screens[0].scale, 1.0);
    }
}
