//! The contact card: everything the location section shows, in one value.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::AppConfig;
use crate::hours::{is_open_at, NextChange, WeeklySchedule};
use crate::location::{
    calculate_distance, format_distance, generate_directions_from, generate_map_urls,
    BusinessLocation, GeolocationError, MapUrls, VisitorPosition,
};

/// Distance from the visitor to the shop.
#[derive(Debug, Clone, Serialize)]
pub struct DistanceInfo {
    pub km: f64,
    pub formatted: String,
    /// Directions link starting at the visitor's position.
    pub directions: String,
    pub visitor: VisitorPosition,
}

impl DistanceInfo {
    pub fn new(visitor: VisitorPosition, location: &BusinessLocation) -> Self {
        let km = calculate_distance(visitor.coordinates, location.coordinates);
        Self {
            km,
            formatted: format_distance(km),
            directions: generate_directions_from(visitor.coordinates, location),
            visitor,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactCard {
    pub location: BusinessLocation,
    pub maps: MapUrls,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<DistanceInfo>,
    /// Why there is no distance, when the visitor couldn't be located.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_note: Option<String>,
    pub open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_change: Option<NextChange>,
    pub status: String,
    pub local_time: NaiveDateTime,
}

impl ContactCard {
    /// Assemble the card for shop-local time `at`.
    pub fn build(config: &AppConfig, visitor: Option<VisitorPosition>, at: NaiveDateTime) -> Self {
        let location = config.location.clone();
        let maps = generate_map_urls(&location, config.maps_api_key.as_deref());
        let distance = visitor.map(|v| DistanceInfo::new(v, &location));

        let open = is_open_at(&location.hours, at);
        let next_change = WeeklySchedule::standard().next_change(at);
        let status = status_line(open, next_change.as_ref(), at);

        Self {
            location,
            maps,
            distance,
            distance_note: None,
            open,
            next_change,
            status,
            local_time: at,
        }
    }

    /// Build from a geolocation attempt; on failure the card shows the
    /// address only and carries the error message.
    pub fn from_lookup(
        config: &AppConfig,
        lookup: Result<VisitorPosition, GeolocationError>,
        at: NaiveDateTime,
    ) -> Self {
        match lookup {
            Ok(pos) => Self::build(config, Some(pos), at),
            Err(e) => {
                tracing::warn!(error = %e, "visitor position unavailable, showing address only");
                let mut card = Self::build(config, None, at);
                card.distance_note = Some(e.to_string());
                card
            }
        }
    }

    /// Human-readable rendering for the terminal.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("  \u{2615} {}\n", self.location.name));
        out.push_str(&format!("  \u{1F4CD} {}\n", self.location.address));
        out.push_str(&format!("  \u{1F4D0} {}\n", self.location.coordinates));
        if let Some(phone) = &self.location.phone {
            out.push_str(&format!("  \u{260E}\u{FE0F}  {}\n", phone));
        }
        if let Some(web) = &self.location.website {
            out.push_str(&format!("  \u{1F310} {}\n", web));
        }

        match (&self.distance, &self.distance_note) {
            (Some(d), _) => {
                let from = d.visitor.city.as_deref().unwrap_or("your location");
                out.push_str(&format!("  \u{1F6B6} {} away (from {}, via {})\n", d.formatted, from, d.visitor.source));
            }
            (None, Some(note)) => out.push_str(&format!("  \u{26A0}\u{FE0F}  {}\n", note)),
            (None, None) => {}
        }

        out.push_str(&format!("  \u{1F552} {}\n", self.status));
        out.push('\n');
        for line in &self.location.hours {
            out.push_str(&format!("     {}\n", line));
        }
        out.push('\n');
        out.push_str(&format!("  View:       {}\n", self.maps.view));
        let directions = self.distance.as_ref().map_or(&self.maps.directions, |d| &d.directions);
        out.push_str(&format!("  Directions: {}\n", directions));
        out.push_str(&format!("  Search:     {}\n", self.maps.search));
        out.push_str(&format!("  Embed:      {}\n", self.maps.embed));
        out
    }
}

/// "Open now · Closes at 9:00 PM", or just "Closed" when nothing is scheduled.
pub(crate) fn status_line(open: bool, next: Option<&NextChange>, at: NaiveDateTime) -> String {
    let head = if open { "Open now" } else { "Closed" };
    match next {
        Some(n) => format!("{} \u{00B7} {}", head, n.describe(at)),
        None => head.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{Coordinates, PositionSource};
    use chrono::NaiveDate;

    fn wednesday(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 21).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn visitor() -> VisitorPosition {
        VisitorPosition {
            coordinates: Coordinates::new(40.7150, -74.0100),
            source: PositionSource::Manual,
            city: None,
            timestamp: 0,
        }
    }

    #[test]
    fn test_card_with_visitor() {
        let card = ContactCard::build(&AppConfig::default(), Some(visitor()), wednesday(12, 0));
        let d = card.distance.as_ref().unwrap();
        assert_eq!(d.formatted, "422m");
        assert!(d.directions.starts_with("https://maps.google.com/maps/dir/40.715,-74.01/"));
        assert!(card.open);
        assert_eq!(card.status, "Open now \u{00B7} Closes at 9:00 PM");
    }

    #[test]
    fn test_card_falls_back_to_address() {
        let card = ContactCard::from_lookup(
            &AppConfig::default(),
            Err(GeolocationError::Unsupported),
            wednesday(23, 0),
        );
        assert!(card.distance.is_none());
        assert!(card.distance_note.as_deref().unwrap().contains("not available"));
        assert!(!card.open);
        assert_eq!(card.status, "Closed \u{00B7} Opens tomorrow at 6:00 AM");

        let text = card.render();
        assert!(text.contains("123 Coffee Street"));
        assert!(text.contains("maps/dir//123%20Coffee"));
    }

    #[test]
    fn test_card_uses_configured_key() {
        let config = AppConfig { maps_api_key: Some("real".into()), ..AppConfig::default() };
        let card = ContactCard::build(&config, None, wednesday(9, 0));
        assert!(card.maps.embed.contains("key=real&"));
    }

    #[test]
    fn test_card_json_shape() {
        let card = ContactCard::build(&AppConfig::default(), None, wednesday(9, 0));
        let v = serde_json::to_value(&card).unwrap();
        assert_eq!(v["open"], true);
        assert_eq!(v["next_change"]["kind"], "closes");
        assert!(v.get("distance").is_none());
        assert!(v["maps"]["search"].as_str().unwrap().contains("Nexus%20Caf%C3%A9"));
    }
}
