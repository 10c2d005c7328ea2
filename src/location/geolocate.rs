//! Visitor geolocation: cache first, then IP lookup.
//!
//! Flow:  fresh cached position → IP API (unless offline) → error
//!
//! Callers are expected to fall back to showing the static address when
//! this fails; the error carries a message fit for display.

use serde::Deserialize;
use std::error::Error as _;
use std::io;
use std::time::Duration;

use super::cache::{PositionCache, DEFAULT_MAX_AGE_MS};
use super::types::{Coordinates, GeolocationError, PositionSource, VisitorPosition};

const IP_API_URL: &str = "https://ipapi.co/json/";
const USER_AGENT: &str = concat!("CafeLocator/", env!("CARGO_PKG_VERSION"));

/// Tuning for a position lookup.
#[derive(Debug, Clone, Copy)]
pub struct GeolocationOptions {
    /// Network timeout for the IP lookup.
    pub timeout: Duration,
    /// How old a cached position may be before it is ignored, in ms.
    pub maximum_age_ms: i64,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            maximum_age_ms: DEFAULT_MAX_AGE_MS,
        }
    }
}

/// Looks up where the visitor is.
pub struct Geolocator {
    cache: PositionCache,
    options: GeolocationOptions,
    offline: bool,
    endpoint: String,
}

impl Geolocator {
    pub fn new(options: GeolocationOptions) -> Self {
        Self::with_cache(PositionCache::load(), options)
    }

    /// Create a geolocator with a specific cache (for testing).
    pub fn with_cache(cache: PositionCache, options: GeolocationOptions) -> Self {
        Self {
            cache: cache.with_max_age(options.maximum_age_ms),
            options,
            offline: false,
            endpoint: IP_API_URL.to_string(),
        }
    }

    /// Offline mode: only the cache is consulted.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = endpoint.into();
    }

    /// Current visitor position.
    pub fn locate(&mut self) -> Result<VisitorPosition, GeolocationError> {
        if let Some(pos) = self.cache.get() {
            tracing::debug!(lat = pos.coordinates.lat, lng = pos.coordinates.lng, "using cached position");
            return Ok(pos);
        }

        if self.offline {
            return Err(GeolocationError::Unsupported);
        }

        let pos = self.ip_lookup()?;
        self.cache.put(&pos);
        Ok(pos)
    }

    /// Record a position the caller already knows (e.g. `--lat/--lng`).
    pub fn remember(&mut self, coordinates: Coordinates) -> VisitorPosition {
        let pos = VisitorPosition::manual(coordinates);
        self.cache.put(&pos);
        pos
    }

    fn ip_lookup(&self) -> Result<VisitorPosition, GeolocationError> {
        tracing::info!(endpoint = %self.endpoint, "looking up visitor position by IP");

        let response = ureq::get(&self.endpoint)
            .set("User-Agent", USER_AGENT)
            .timeout(self.options.timeout)
            .call()
            .map_err(classify_error)?;

        let r: IpApiResult = response
            .into_json()
            .map_err(|e| GeolocationError::InvalidResponse(e.to_string()))?;

        let pos = r.into_position(chrono::Utc::now().timestamp_millis())?;
        tracing::info!(city = ?pos.city, "visitor position resolved");
        Ok(pos)
    }
}

fn classify_error(e: ureq::Error) -> GeolocationError {
    match e {
        ureq::Error::Status(code, _) => GeolocationError::Network(format!("HTTP {}", code)),
        ureq::Error::Transport(t) => match t.source() {
            Some(cause) if is_timeout(cause) => GeolocationError::Timeout,
            _ => GeolocationError::Network(t.to_string()),
        },
    }
}

/// True when any error in the chain is an I/O timeout.
fn is_timeout(err: &(dyn std::error::Error + 'static)) -> bool {
    std::iter::successors(Some(err), |&e| e.source()).any(|e| {
        e.downcast_ref::<io::Error>()
            .is_some_and(|io| matches!(io.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock))
    })
}

// ─── ipapi.co response ──────────────────────────────────────────

#[derive(Deserialize)]
struct IpApiResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    country_name: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

impl IpApiResult {
    fn into_position(self, timestamp: i64) -> Result<VisitorPosition, GeolocationError> {
        if self.error {
            return Err(GeolocationError::InvalidResponse(
                self.reason.unwrap_or_else(|| "provider reported an error".into()),
            ));
        }
        let lat = self.latitude.ok_or_else(|| GeolocationError::InvalidResponse("no latitude".into()))?;
        let lng = self.longitude.ok_or_else(|| GeolocationError::InvalidResponse("no longitude".into()))?;
        let coordinates = Coordinates::new(lat, lng);
        if !coordinates.is_valid() {
            return Err(GeolocationError::InvalidResponse(format!("coordinates out of range: {}, {}", lat, lng)));
        }

        let city = match (self.city, self.country_name) {
            (Some(city), Some(country)) if !country.is_empty() => Some(format!("{}, {}", city, country)),
            (city, _) => city,
        };

        Ok(VisitorPosition {
            coordinates,
            source: PositionSource::Ip,
            city,
            timestamp,
        })
    }
}
