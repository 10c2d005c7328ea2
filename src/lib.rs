//! Cafe Locator: location utilities for a coffee shop contact card.
//!
//! The core is a handful of pure functions: great-circle distance between
//! two coordinates, human-readable distance formatting, map-provider URL
//! construction, and opening-hours evaluation. Around them sit the visitor
//! geolocation layer, configuration, and a small HTTP API.
//!
//! ```
//! use cafe_locator::{calculate_distance, format_distance, Coordinates};
//!
//! let shop = Coordinates::new(40.7127753, -74.0059413);
//! let visitor = Coordinates::new(40.7150, -74.0100);
//! assert_eq!(format_distance(calculate_distance(shop, visitor)), "422m");
//! ```

pub mod card;
pub mod config;
pub mod hours;
pub mod location;
pub mod server;

pub use card::ContactCard;
pub use config::{AppConfig, ConfigError};
pub use hours::{is_open_at, NextChange, WeeklySchedule};
pub use location::{
    calculate_distance, format_distance, generate_directions_from, generate_map_urls,
    BusinessLocation, Coordinates, GeolocationError, MapUrls, VisitorPosition,
};
