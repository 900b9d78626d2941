//! Placement eligibility and restricted zones
//!
//! No restricted-zone geometry exists yet: every location is eligible and
//! the zone listing is a single empty placeholder polygon.

use crate::error::Result;
use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};

/// A GeoJSON geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

/// Decide whether a location may host a new retailer
///
/// Returns [`crate::error::Error::Ineligible`] with a human-readable reason
/// when it may not.
pub fn check_eligibility(point: Coordinates) -> Result<()> {
    point.validate()?;
    Ok(())
}

/// All restricted zones as GeoJSON polygons
pub fn restricted_zones() -> Vec<Geometry> {
    vec![Geometry {
        kind: "Polygon".to_string(),
        coordinates: Vec::new(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_valid_point_is_eligible() {
        assert!(check_eligibility(Coordinates::new(37.498095, 127.027610)).is_ok());
        assert!(check_eligibility(Coordinates::new(-33.8688, 151.2093)).is_ok());
    }

    #[test]
    fn test_invalid_point_is_rejected() {
        assert!(check_eligibility(Coordinates::new(120.0, 127.0)).is_err());
    }

    #[test]
    fn test_restricted_zones_placeholder() {
        let zones = restricted_zones();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].kind, "Polygon");

        let json = serde_json::to_value(&zones[0]).unwrap();
        assert_eq!(json["type"], "Polygon");
    }
}
