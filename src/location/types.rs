//! Core value types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on the globe in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude (-90 to 90)
    pub lat: f64,
    /// Longitude (-180 to 180)
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True if both components are inside their geographic ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lng >= 0.0 { 'E' } else { 'W' };
        write!(f, "{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", self.lat.abs(), ns, self.lng.abs(), ew)
    }
}

/// A named place the site points visitors to.
///
/// Read-only reference data: built once from configuration and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessLocation {
    pub name: String,
    /// Free-text postal address, shown as-is and used in map queries.
    pub address: String,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Weekly hours, one human-readable line per day (e.g. "Monday: 6:00 AM - 9:00 PM").
    #[serde(default)]
    pub hours: Vec<String>,
}

impl BusinessLocation {
    pub fn new(name: impl Into<String>, address: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            coordinates,
            phone: None,
            website: None,
            hours: Vec::new(),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_hours<I, S>(mut self, hours: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hours = hours.into_iter().map(Into::into).collect();
        self
    }

    /// The shop the site ships with until a config file says otherwise.
    pub fn nexus_cafe() -> Self {
        Self::new(
            "Nexus Caf\u{00E9}",
            "123 Coffee Street, Downtown District, Your City, State 12345",
            Coordinates::new(40.7127753, -74.0059413),
        )
        .with_phone("+1 (555) 123-CAFE")
        .with_website("https://nexuscafe.com")
        .with_hours(crate::hours::WeeklySchedule::standard().display_lines())
    }
}

impl Default for BusinessLocation {
    fn default() -> Self {
        Self::nexus_cafe()
    }
}

/// Where a visitor position came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSource {
    Ip,
    Cache,
    Manual,
}

impl fmt::Display for PositionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip => write!(f, "IP"),
            Self::Cache => write!(f, "Cache"),
            Self::Manual => write!(f, "Manual"),
        }
    }
}

/// The visitor's position, as far as we could determine it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitorPosition {
    pub coordinates: Coordinates,
    pub source: PositionSource,
    /// City reported by the provider, if any.
    #[serde(default)]
    pub city: Option<String>,
    /// Acquisition time, Unix milliseconds.
    pub timestamp: i64,
}

impl VisitorPosition {
    pub fn manual(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            source: PositionSource::Manual,
            city: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Reasons the visitor position could not be obtained.
#[derive(Debug, thiserror::Error)]
pub enum GeolocationError {
    /// No network lookup allowed and nothing cached.
    #[error("Geolocation is not available (offline and no cached position)")]
    Unsupported,
    #[error("Geolocation request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid geolocation response: {0}")]
    InvalidResponse(String),
}
