//! Great-circle distance and its display form.

use super::types::Coordinates;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometers.
///
/// No range validation: out-of-range degrees still yield a finite,
/// non-negative number, it just isn't a meaningful distance.
pub fn calculate_distance(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Clamp rounding noise so sqrt(1 - h) stays real.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Render a distance for the contact card.
///
/// Below one kilometer: whole meters ("453m"). Otherwise one decimal ("1.2km"),
/// with exact binary ties rounded up ("1.25" -> "1.3km").
pub fn format_distance(distance_km: f64) -> String {
    if distance_km < 1.0 {
        format!("{}m", (distance_km * 1000.0).round() as i64)
    } else {
        format!("{}km", one_decimal(distance_km))
    }
}

/// One-decimal rendering that breaks exact ties upwards.
///
/// `{:.1}` rounds the exact binary value to nearest but sends ties to even.
/// A value sits exactly halfway between two tenths only when it is an odd
/// multiple of 0.25, and then `x * 10` is exact, so `round()` settles it.
fn one_decimal(x: f64) -> String {
    let quarters = x * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 == 1.0 {
        format!("{:.1}", (x * 10.0).round() / 10.0)
    } else {
        format!("{:.1}", x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SHOP: Coordinates = Coordinates::new(40.7127753, -74.0059413);
    const TIMES_SQUARE: Coordinates = Coordinates::new(40.7580, -73.9855);
    const BERLIN: Coordinates = Coordinates::new(52.5200, 13.4050);
    const PARIS: Coordinates = Coordinates::new(48.8566, 2.3522);

    #[test]
    fn test_same_point_is_zero() {
        for p in [SHOP, BERLIN, Coordinates::new(90.0, 0.0), Coordinates::new(-33.9, 151.2)] {
            assert_eq!(calculate_distance(p, p), 0.0);
        }
    }

    #[test]
    fn test_symmetry() {
        let pairs = [(SHOP, TIMES_SQUARE), (BERLIN, PARIS), (SHOP, PARIS)];
        for (p, q) in pairs {
            assert_abs_diff_eq!(calculate_distance(p, q), calculate_distance(q, p), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_equator_to_pole_quarter() {
        let d = calculate_distance(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 90.0));
        assert_abs_diff_eq!(d, 10007.5, epsilon = 1.0);
        let d = calculate_distance(Coordinates::new(0.0, 0.0), Coordinates::new(90.0, 0.0));
        assert_abs_diff_eq!(d, 10007.5, epsilon = 1.0);
    }

    #[test]
    fn test_known_city_pairs() {
        assert_abs_diff_eq!(calculate_distance(BERLIN, PARIS), 877.5, epsilon = 1.0);
        assert_abs_diff_eq!(calculate_distance(SHOP, TIMES_SQUARE), 5.32, epsilon = 0.01);
    }

    #[test]
    fn test_monotonic_along_meridian() {
        let origin = Coordinates::new(0.0, 0.0);
        let mut last = 0.0;
        for step in 1..=18 {
            let d = calculate_distance(origin, Coordinates::new(step as f64 * 10.0, 0.0));
            assert!(d > last, "step {}: {} <= {}", step, d, last);
            last = d;
        }
    }

    #[test]
    fn test_antipodes_never_nan() {
        let d = calculate_distance(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 180.0));
        assert!(d.is_finite());
        assert_abs_diff_eq!(d, EARTH_RADIUS_KM * std::f64::consts::PI, epsilon = 1e-6);
    }

    #[test]
    fn test_out_of_range_input_still_defined() {
        let d = calculate_distance(Coordinates::new(200.0, -400.0), Coordinates::new(-95.0, 10.0));
        assert!(d.is_finite() && d >= 0.0);
    }

    #[test]
    fn test_format_meters() {
        assert_eq!(format_distance(0.453), "453m");
        assert_eq!(format_distance(0.4532), "453m");
        assert_eq!(format_distance(0.999), "999m");
        assert_eq!(format_distance(0.0), "0m");
    }

    #[test]
    fn test_format_kilometers() {
        assert_eq!(format_distance(1.2345), "1.2km");
        assert_eq!(format_distance(1.0), "1.0km");
        assert_eq!(format_distance(10007.54), "10007.5km");
    }

    #[test]
    fn test_format_kilometer_ties_round_up() {
        assert_eq!(format_distance(1.25), "1.3km");
        assert_eq!(format_distance(2.25), "2.3km");
        assert_eq!(format_distance(1.75), "1.8km");
        assert_eq!(format_distance(1.5), "1.5km");
    }

    #[test]
    fn test_format_kilometer_uses_stored_value() {
        // 1.45 is stored just below the tie, 1.05 just above it.
        assert_eq!(format_distance(1.45), "1.4km");
        assert_eq!(format_distance(1.05), "1.1km");
        assert_eq!(format_distance(1.125), "1.1km");
    }

    #[test]
    fn test_format_just_below_one_km() {
        // Rounds up to a full thousand meters but stays in the meter branch.
        assert_eq!(format_distance(0.9996), "1000m");
    }
}
