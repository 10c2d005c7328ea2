//! Map-provider links for a business location.
//!
//! Pure string construction, nothing here touches the network.

use serde::Serialize;

use super::types::{BusinessLocation, Coordinates};

/// Stand-in for the embed API key when none is configured. The embed URL
/// will not render until a real key replaces it.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

/// The four links the contact section needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapUrls {
    /// Open the place in the map provider.
    pub view: String,
    /// Directions to the place from the visitor's current position.
    pub directions: String,
    /// Frame-embeddable map widget.
    pub embed: String,
    /// Name + address search.
    pub search: String,
}

/// Build the map links for `location`.
///
/// `api_key` goes into the embed URL; `None` yields [`PLACEHOLDER_API_KEY`].
pub fn generate_map_urls(location: &BusinessLocation, api_key: Option<&str>) -> MapUrls {
    let address = encode_component(&location.address);
    let name = encode_component(&location.name);
    let key = encode_component(api_key.unwrap_or(PLACEHOLDER_API_KEY));

    MapUrls {
        view: format!("https://maps.google.com/?q={}", address),
        directions: format!("https://maps.google.com/maps/dir//{}", address),
        embed: format!(
            "https://www.google.com/maps/embed/v1/place?key={}&q={}&zoom=16",
            key, address
        ),
        search: format!("https://maps.google.com/maps/search/{}+{}", name, address),
    }
}

/// Directions link with an explicit starting point.
pub fn generate_directions_from(origin: Coordinates, location: &BusinessLocation) -> String {
    format!(
        "https://maps.google.com/maps/dir/{},{}/{}",
        origin.lat,
        origin.lng,
        encode_component(&location.address)
    )
}

// ─── Percent-encoding ───────────────────────────────────────────

/// Percent-encode a URI component, byte-wise over UTF-8.
///
/// Leaves `A-Z a-z 0-9 - _ . ! ~ * ' ( )` untouched, like the browser's
/// `encodeURIComponent`.
pub fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
