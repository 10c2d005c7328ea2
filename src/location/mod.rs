//! Location subsystem.
//!
//! Pure geometry and link building for the shop's location, plus the
//! visitor-position lookup that feeds the distance display.

pub mod cache;
pub mod distance;
pub mod geolocate;
pub mod maps;
pub mod types;

pub use distance::{calculate_distance, format_distance, EARTH_RADIUS_KM};
pub use geolocate::{GeolocationOptions, Geolocator};
pub use maps::{encode_component, generate_directions_from, generate_map_urls, MapUrls, PLACEHOLDER_API_KEY};
pub use types::{BusinessLocation, Coordinates, GeolocationError, PositionSource, VisitorPosition};
