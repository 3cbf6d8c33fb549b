// File: ./src/config.rs
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::admin::DEFAULT_ADMIN_PASSWORD;
use crate::client::DEFAULT_TIMEOUT;
use crate::pomodoro::{DEFAULT_BREAK_SECS, DEFAULT_WORK_SECS};

pub const DEFAULT_DATA_SOURCE: &str = "./data.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Path or http(s) URL of the school document.
    pub data_source: String,
    pub admin_password: String,
    pub classes: Vec<String>,
    pub pomodoro_work_minutes: u32,
    pub pomodoro_break_minutes: u32,
    pub allow_insecure_certs: bool,
    /// Seconds before a data or calendar request is given up.
    pub fetch_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            classes: default_classes(),
            pomodoro_work_minutes: DEFAULT_WORK_SECS / 60,
            pomodoro_break_minutes: DEFAULT_BREAK_SECS / 60,
            allow_insecure_certs: false,
            fetch_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// 21HR through 28HR.
pub fn default_classes() -> Vec<String> {
    (21..=28).map(|i| format!("{}HR", i)).collect()
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        ProjectDirs::from("org", "jikanwari", "jikanwari")
            .map(|proj| proj.config_dir().join("config.toml"))
    }

    /// Loads the user config; a missing file means defaults.
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        if config.classes.is_empty() {
            config.classes = default_classes();
        }
        Ok(config)
    }

    pub fn work_secs(&self) -> u32 {
        self.pomodoro_work_minutes.max(1).saturating_mul(60)
    }

    pub fn break_secs(&self) -> u32 {
        self.pomodoro_break_minutes.max(1).saturating_mul(60)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}
