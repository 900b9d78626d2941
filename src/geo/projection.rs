//! Projected-to-geographic coordinate conversion
//!
//! The bulk address file stores positions in a Transverse Mercator grid
//! (Korea 2000 / Central Belt 2010, EPSG:5186, by default). This module turns
//! those grid coordinates into WGS84 latitude/longitude using the series
//! expansion of the inverse TM projection (USGS Professional Paper 1395).
//! GRS80 and WGS84 are treated as the same datum.

use crate::config::ProjectionConfig;
use crate::geo::{is_sentinel, Coordinates};

/// Inverse Transverse Mercator projection on an ellipsoid
#[derive(Debug, Clone, Copy)]
pub struct TransverseMercator {
    a: f64,
    e2: f64,
    ep2: f64,
    lat0: f64,
    lon0: f64,
    k0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl TransverseMercator {
    /// Build a projection from configured parameters (angles in degrees)
    pub fn new(params: &ProjectionConfig) -> Self {
        let f = 1.0 / params.inverse_flattening;
        let e2 = f * (2.0 - f);
        Self {
            a: params.semi_major_axis,
            e2,
            ep2: e2 / (1.0 - e2),
            lat0: params.latitude_of_origin.to_radians(),
            lon0: params.central_meridian.to_radians(),
            k0: params.scale_factor,
            false_easting: params.false_easting,
            false_northing: params.false_northing,
        }
    }

    /// Meridional arc length from the equator to latitude `phi` (radians)
    fn meridian_arc(&self, phi: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        self.a
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }

    /// Convert grid easting/northing (meters) to latitude/longitude (degrees)
    ///
    /// Returns `None` if the result is not a finite, in-range coordinate.
    pub fn inverse(&self, easting: f64, northing: f64) -> Option<Coordinates> {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        let m = self.meridian_arc(self.lat0) + (northing - self.false_northing) / self.k0;
        let mu = m / (self.a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

        let s = (1.0 - e2).sqrt();
        let e1 = (1.0 - s) / (1.0 + s);
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin_phi1, cos_phi1) = phi1.sin_cos();
        let tan_phi1 = phi1.tan();
        let w = 1.0 - e2 * sin_phi1 * sin_phi1;
        let nu1 = self.a / w.sqrt();
        let rho1 = self.a * (1.0 - e2) / w.powf(1.5);
        let t1 = tan_phi1 * tan_phi1;
        let c1 = self.ep2 * cos_phi1 * cos_phi1;
        let d = (easting - self.false_easting) / (nu1 * self.k0);
        let ep2 = self.ep2;

        let lat = phi1
            - (nu1 * tan_phi1 / rho1)
                * (d.powi(2) / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let lon = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos_phi1;

        let coords = Coordinates::new(lat.to_degrees(), lon.to_degrees());
        coords.validate().ok().map(|_| coords)
    }
}

impl Default for TransverseMercator {
    fn default() -> Self {
        Self::new(&ProjectionConfig::default())
    }
}

/// Convert an optional projected (x, y) pair into WGS84
///
/// Absent, sentinel and NaN inputs are rejected before the transform runs;
/// a transform that yields a non-finite or out-of-range result is also
/// reported as unavailable.
pub fn to_wgs84(
    projection: &TransverseMercator,
    x: Option<f64>,
    y: Option<f64>,
) -> Option<Coordinates> {
    let (x, y) = (x?, y?);
    if x.is_nan() || y.is_nan() || is_sentinel(x) || is_sentinel(y) {
        return None;
    }
    projection.inverse(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// OSGB 1936 / British National Grid, the worked example in EPSG
    /// Guidance Note 7-2 for Transverse Mercator.
    fn british_national_grid() -> TransverseMercator {
        TransverseMercator::new(&ProjectionConfig {
            semi_major_axis: 6_377_563.396,
            inverse_flattening: 299.324_964_6,
            latitude_of_origin: 49.0,
            central_meridian: -2.0,
            scale_factor: 0.999_601_271_7,
            false_easting: 400_000.0,
            false_northing: -100_000.0,
        })
    }

    #[test]
    fn test_reference_fixture() {
        let tm = british_national_grid();
        let coords = to_wgs84(&tm, Some(577_274.99), Some(69_740.50)).unwrap();

        assert_abs_diff_eq!(coords.lat, 50.5, epsilon = 1e-4);
        assert_abs_diff_eq!(coords.lon, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_origin_maps_to_central_point() {
        let tm = TransverseMercator::default();
        let coords = to_wgs84(&tm, Some(200_000.0), Some(600_000.0)).unwrap();

        assert_abs_diff_eq!(coords.lat, 38.0, epsilon = 1e-9);
        assert_abs_diff_eq!(coords.lon, 127.0, epsilon = 1e-9);
    }

    #[test]
    fn test_seoul_grid_point_lands_in_korea() {
        let tm = TransverseMercator::default();
        let coords = to_wgs84(&tm, Some(202_000.0), Some(500_000.0)).unwrap();

        assert!(coords.lat > 37.0 && coords.lat < 37.2);
        assert!(coords.lon > 127.0 && coords.lon < 127.1);
    }

    #[test]
    fn test_sentinel_is_unavailable() {
        let tm = TransverseMercator::default();
        assert!(to_wgs84(&tm, Some(-1.0), Some(-1.0)).is_none());
        assert!(to_wgs84(&tm, Some(200_000.0), Some(-1.0)).is_none());
    }

    #[test]
    fn test_nan_is_unavailable() {
        let tm = TransverseMercator::default();
        assert!(to_wgs84(&tm, Some(f64::NAN), Some(5.0)).is_none());
    }

    #[test]
    fn test_absent_is_unavailable() {
        let tm = TransverseMercator::default();
        assert!(to_wgs84(&tm, None, None).is_none());
        assert!(to_wgs84(&tm, Some(200_000.0), None).is_none());
    }

    #[test]
    fn test_non_finite_result_is_unavailable() {
        let tm = TransverseMercator::default();
        assert!(to_wgs84(&tm, Some(f64::INFINITY), Some(600_000.0)).is_none());
        assert!(to_wgs84(&tm, Some(200_000.0), Some(1.0e12)).is_none());
    }
}
