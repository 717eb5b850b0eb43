use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::window::DEFAULT_RADIUS;

/// Place shown when nothing else was asked for.
pub const DEFAULT_PLACE: &str = "Madrigal de la Vera";

/// Auto-refresh period when none is configured.
pub const DEFAULT_REFRESH: Duration = Duration::from_secs(60 * 60);

/// Longest accepted auto-refresh period, in seconds (one week).
pub const MAX_REFRESH_SECS: u64 = 7 * 24 * 60 * 60;

/// Base URLs of the upstream services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub geocoding: String,
    pub forecast: String,
    pub reverse: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast: "https://api.open-meteo.com/v1/forecast".to_string(),
            reverse: "https://nominatim.openstreetmap.org/reverse".to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_place = "Madrid"
/// window_radius = 12
/// refresh_interval_secs = 3600
///
/// [endpoints]
/// forecast = "https://api.open-meteo.com/v1/forecast"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Place loaded on start-up and by `refresh` before any search.
    pub default_place: Option<String>,

    /// Hours shown on each side of "now".
    pub window_radius: Option<usize>,

    pub refresh_interval_secs: Option<u64>,

    /// Language of geocoding results, e.g. "es".
    pub language: Option<String>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Config {
    pub fn default_place(&self) -> &str {
        self.default_place
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PLACE)
    }

    pub fn set_default_place(&mut self, place: &str) -> Result<()> {
        let place = place.trim();
        if place.is_empty() {
            return Err(anyhow!("Default place must not be empty"));
        }
        self.default_place = Some(place.to_string());
        Ok(())
    }

    pub fn window_radius(&self) -> usize {
        self.window_radius.filter(|r| *r > 0).unwrap_or(DEFAULT_RADIUS)
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval_secs
            .filter(|s| *s > 0)
            .map(|s| Duration::from_secs(s.min(MAX_REFRESH_SECS)))
            .unwrap_or(DEFAULT_REFRESH)
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or("en")
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "raincheck", "raincheck")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
