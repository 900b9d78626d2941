//! Great-circle distance

use crate::constants::geo::EARTH_RADIUS_METERS;
use crate::geo::Coordinates;

/// Calculate the distance between two points in meters (Haversine formula)
///
/// The squared half-chord is clamped to [0, 1] so rounding on nearly
/// antipodal or identical inputs never pushes `sqrt`/`asin` out of domain.
///
/// # Arguments
/// * `p1` - First point
/// * `p2` - Second point
///
/// # Returns
/// Distance in meters
pub fn haversine_distance(p1: Coordinates, p2: Coordinates) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lon = (p2.lon - p1.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
}

/// Check if a point is within `radius_meters` of `center`
pub fn is_within(point: Coordinates, center: Coordinates, radius_meters: f64) -> bool {
    haversine_distance(point, center) <= radius_meters
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const GANGNAM: Coordinates = Coordinates {
        lat: 37.498095,
        lon: 127.027610,
    };

    #[test]
    fn test_identical_points() {
        assert_eq!(haversine_distance(GANGNAM, GANGNAM), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let other = Coordinates::new(37.2731321, 127.0061042);
        let d1 = haversine_distance(GANGNAM, other);
        let d2 = haversine_distance(other, GANGNAM);
        assert!(d1 > 0.0);
        assert_relative_eq!(d1, d2, epsilon = 1e-9);
    }

    #[test]
    fn test_one_degree_latitude() {
        let north = Coordinates::new(GANGNAM.lat + 1.0, GANGNAM.lon);
        let distance = haversine_distance(GANGNAM, north);

        // 1 degree of arc on a 6371 km sphere
        assert_relative_eq!(distance, 111_194.93, epsilon = 0.1);
    }

    #[test]
    fn test_antipodal_points_stay_finite() {
        let p1 = Coordinates::new(0.0, 0.0);
        let p2 = Coordinates::new(0.0, 180.0);
        let distance = haversine_distance(p1, p2);

        assert!(distance.is_finite());
        assert_relative_eq!(distance, std::f64::consts::PI * EARTH_RADIUS_METERS, epsilon = 1e-3);
    }

    #[test]
    fn test_is_within() {
        // ~33 m north
        let near = Coordinates::new(GANGNAM.lat + 0.0003, GANGNAM.lon);
        assert!(is_within(near, GANGNAM, 50.0));

        // ~111 m north
        let far = Coordinates::new(GANGNAM.lat + 0.001, GANGNAM.lon);
        assert!(!is_within(far, GANGNAM, 50.0));
    }
}
