//! Application configuration management.
//!
//! Configuration is stored at `~/.config/rsvpboard/config.json`. A missing
//! file means defaults; every field may be omitted.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{default_events, EventSet, EventSetError, TrackedEvent, DEFAULT_PRIMARY_EVENT};
use crate::source::DEFAULT_REQUEST_TIMEOUT_SECS;

/// Application name used for config directory paths
const APP_NAME: &str = "rsvpboard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the configured source.
pub const SOURCE_ENV_VAR: &str = "RSVPBOARD_SOURCE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File, snapshot directory or URL to read guests from.
    pub source: Option<String>,
    pub events: Vec<TrackedEvent>,
    /// Key of the event used for status filtering and the response rate.
    pub primary_event: String,
    /// Whether free-text search also matches the relationship label.
    pub search_includes_side: bool,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            events: default_events(),
            primary_event: DEFAULT_PRIMARY_EVENT.to_string(),
            search_includes_side: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Validated event set: at least one event, unique keys, and a primary
    /// event that is one of them.
    pub fn event_set(&self) -> Result<EventSet, EventSetError> {
        EventSet::new(self.events.clone(), &self.primary_event)
    }

    /// The source to read: `explicit` (flag or environment) wins over the
    /// configured one. Blank values count as unset.
    pub fn effective_source(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .or(self.source.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}
