use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{location::LocationOverrides, provider::DEFAULT_USER_AGENT};

pub const DEFAULT_HOURLY_PERIODS: usize = 12;
pub const DEFAULT_RADAR_OUTPUT: &str = "radar.gif";
const STATION_CACHE_FILE: &str = "radar_stations.json";

/// A location saved with `wxreport configure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub region: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Contact put in the User-Agent NWS asks for, e.g. an email address.
    pub contact: Option<String>,

    /// Where the radar station list is cached.
    pub station_cache: Option<PathBuf>,

    /// Where the radar loop GIF is written.
    pub radar_output: Option<PathBuf>,

    /// How many hourly forecast periods to show.
    pub hourly_periods: Option<usize>,

    /// Example TOML:
    /// [location]
    /// latitude = 42.36
    /// longitude = -71.06
    /// city = "Boston"
    pub location: Option<SavedLocation>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "wxreport", "wxreport")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// User-Agent sent with every request: `(wxreport, <contact>)`.
    pub fn user_agent(&self) -> String {
        match self.contact.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(contact) => format!("(wxreport, {contact})"),
            None => DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn station_cache_path(&self) -> Result<PathBuf> {
        match &self.station_cache {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.cache_dir().join(STATION_CACHE_FILE)),
        }
    }

    pub fn radar_output_path(&self) -> PathBuf {
        self.radar_output.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_RADAR_OUTPUT))
    }

    pub fn hourly_periods(&self) -> usize {
        self.hourly_periods.unwrap_or(DEFAULT_HOURLY_PERIODS)
    }

    /// The saved location as overrides, to be used when flags and environment
    /// don't provide coordinates.
    pub fn location_overrides(&self) -> LocationOverrides {
        match &self.location {
            Some(loc) => LocationOverrides {
                latitude: Some(loc.latitude.to_string()),
                longitude: Some(loc.longitude.to_string()),
                city: loc.city.clone(),
                region: loc.region.clone(),
            },
            None => LocationOverrides::default(),
        }
    }
}
