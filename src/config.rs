//! Application configuration at ~/.cafe/config.json.
//!
//! Every field has a default, so a missing file means "the built-in shop".
//! `CAFE_MAPS_API_KEY` overrides the map key from the file.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::location::{BusinessLocation, PLACEHOLDER_API_KEY};

pub const API_KEY_ENV: &str = "CAFE_MAPS_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid shop coordinates: {0}")]
    InvalidCoordinates(String),
    #[error("Unknown timezone '{0}'. Use IANA format (e.g. America/New_York).")]
    UnknownTimezone(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// The shop shown on the contact card.
    #[serde(default)]
    pub location: BusinessLocation,
    /// Map provider key for the embed link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps_api_key: Option<String>,
    /// IANA zone the shop's hours are expressed in. Defaults to the system zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            location: BusinessLocation::default(),
            maps_api_key: None,
            timezone: None,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cafe")
            .join("config.json")
    }

    /// Load from the default path, falling back to built-in values if the
    /// file doesn't exist, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using built-in location");
            Self::default()
        };
        config.apply_env(|k| std::env::var(k).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a specific file. No environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        tracing::info!(path = %path.display(), shop = %config.location.name, "loaded config");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(io_err)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.maps_api_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = self.location.coordinates;
        if !c.lat.is_finite() || !c.lng.is_finite() || !c.is_valid() {
            return Err(ConfigError::InvalidCoordinates(format!(
                "lat {} lng {} (Lat: -90..90, Lng: -180..180)",
                c.lat, c.lng
            )));
        }
        self.tz()?;
        Ok(())
    }

    pub fn tz(&self) -> Result<Option<Tz>, ConfigError> {
        self.timezone
            .as_deref()
            .map(|s| s.parse::<Tz>().map_err(|_| ConfigError::UnknownTimezone(s.to_string())))
            .transpose()
    }

    /// Key for the embed link; the placeholder when none is configured.
    pub fn api_key(&self) -> &str {
        self.maps_api_key.as_deref().unwrap_or(PLACEHOLDER_API_KEY)
    }

    /// Shop-local wall-clock time for the given instant.
    pub fn local_time(&self, now: DateTime<Utc>) -> NaiveDateTime {
        match self.tz() {
            Ok(Some(tz)) => now.with_timezone(&tz).naive_local(),
            _ => now.with_timezone(&Local).naive_local(),
        }
    }
}
