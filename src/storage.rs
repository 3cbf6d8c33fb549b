// File: ./src/storage.rs
use crate::model::UserSettings;
use anyhow::Result;
use directories::ProjectDirs;
use fs2::FileExt;
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "JIKANWARI_DATA_DIR";
const SETTINGS_FILE: &str = "settings.json";

pub struct LocalStorage;

impl LocalStorage {
    /// Data directory, created on demand. `JIKANWARI_DATA_DIR` takes precedence.
    pub fn data_dir() -> Option<PathBuf> {
        if let Ok(dir) = env::var(DATA_DIR_ENV) {
            let path = PathBuf::from(dir);
            if !path.exists() {
                let _ = fs::create_dir_all(&path);
            }
            return Some(path);
        }

        if let Some(proj) = ProjectDirs::from("org", "jikanwari", "jikanwari") {
            let data_dir = proj.data_dir();
            if !data_dir.exists() {
                let _ = fs::create_dir_all(data_dir);
            }
            return Some(data_dir.to_path_buf());
        }
        None
    }

    pub fn settings_path() -> Option<PathBuf> {
        Self::data_dir().map(|d| d.join(SETTINGS_FILE))
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Runs `f` while holding an exclusive advisory lock on `<path>.lock`.
    pub fn with_lock<T, F>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        lock_file.lock_exclusive()?;
        let result = f();
        let _ = FileExt::unlock(&lock_file);
        result
    }

    pub fn save_settings_to(path: &Path, settings: &UserSettings) -> Result<()> {
        Self::with_lock(path, || {
            let json = serde_json::to_string_pretty(settings)?;
            Self::atomic_write(path, json)
        })
    }

    /// Missing or corrupt files yield the defaults.
    pub fn load_settings_from(path: &Path) -> UserSettings {
        if !path.exists() {
            return UserSettings::default();
        }
        let loaded = Self::with_lock(path, || {
            let json = fs::read_to_string(path)?;
            Ok(serde_json::from_str::<UserSettings>(&json)?)
        });
        match loaded {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                UserSettings::default()
            }
        }
    }

    pub fn save_settings(settings: &UserSettings) -> Result<()> {
        if let Some(path) = Self::settings_path() {
            Self::save_settings_to(&path, settings)?;
        }
        Ok(())
    }

    pub fn load_settings() -> UserSettings {
        match Self::settings_path() {
            Some(path) => Self::load_settings_from(&path),
            None => UserSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Todo;

    #[test]
    fn settings_survive_a_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = UserSettings::default();
        settings.class_id = "25HR".to_string();
        settings.todos.push(Todo::new("bring gym clothes"));

        LocalStorage::save_settings_to(&path, &settings).unwrap();
        assert_eq!(LocalStorage::load_settings_from(&path), settings);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(LocalStorage::load_settings_from(&path), UserSettings::default());
    }

    #[test]
    fn partial_file_keeps_present_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"ical_url": "https://example.com/a.ics"}"#).unwrap();
        let s = LocalStorage::load_settings_from(&path);
        assert_eq!(s.class_id, "21HR");
        assert_eq!(s.ical_url, "https://example.com/a.ics");
    }
}
