// File: ./src/cache.rs
// Last successfully loaded school document, used when the source is unreachable
use crate::model::SchoolData;
use crate::storage::{DATA_DIR_ENV, LocalStorage};
use anyhow::Result;
use directories::ProjectDirs;
use std::collections::hash_map::DefaultHasher;
use std::env;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

pub struct Cache;

impl Cache {
    fn cache_dir() -> Option<PathBuf> {
        if let Ok(dir) = env::var(DATA_DIR_ENV) {
            return Some(PathBuf::from(dir));
        }
        ProjectDirs::from("org", "jikanwari", "jikanwari").map(|p| p.cache_dir().to_path_buf())
    }

    /// One file per source, keyed by a hash of the source string.
    pub fn get_path(source: &str) -> Option<PathBuf> {
        let cache_dir = Self::cache_dir()?;
        if !cache_dir.exists() {
            let _ = fs::create_dir_all(&cache_dir);
        }

        let mut hasher = DefaultHasher::new();
        source.hash(&mut hasher);
        let filename = format!("data_{:x}.json", hasher.finish());

        Some(cache_dir.join(filename))
    }

    pub fn save(source: &str, data: &SchoolData) -> Result<()> {
        if let Some(path) = Self::get_path(source) {
            let json = serde_json::to_string_pretty(data)?;
            LocalStorage::atomic_write(path, json)?;
        }
        Ok(())
    }

    pub fn load(source: &str) -> Result<Option<SchoolData>> {
        if let Some(path) = Self::get_path(source)
            && path.exists()
        {
            let json = fs::read_to_string(path)?;
            let data: SchoolData = serde_json::from_str(&json)?;
            return Ok(Some(data));
        }
        Ok(None)
    }
}
