//! Geodesic distance and radius membership.

use ::geo::{GeodesicDistance, Point};

use crate::error::{Error, Result};

/// Geodesic distance between two coordinates on the WGS-84 ellipsoid, in kilometers.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let a = Point::new(lon1, lat1);
    let b = Point::new(lon2, lat2);
    a.geodesic_distance(&b) / 1000.0
}

/// Returns `true` if `(point_lat, point_lon)` lies within `radius_km` of the center.
///
/// The boundary is inclusive.
pub fn within_radius(
    point_lat: f64,
    point_lon: f64,
    center_lat: f64,
    center_lon: f64,
    radius_km: f64,
) -> bool {
    distance_km(point_lat, point_lon, center_lat, center_lon) <= radius_km
}

/// Rejects non-finite or out-of-range latitude/longitude pairs.
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
    let valid = lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon);

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidCoordinate { lat, lon })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_same_point_is_zero() {
        assert_eq!(distance_km(10.0, 20.0, 10.0, 20.0), 0.0);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        // One degree of latitude near the equator is ~110.6 km on WGS-84
        let d = distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 110.574).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_distance_across_antimeridian() {
        let d = distance_km(0.0, 179.95, 0.0, -179.95);
        assert!(d > 11.0 && d < 11.2, "got {d}");
    }

    #[test]
    fn test_within_radius_boundary_inclusive() {
        let d = distance_km(10.03, 20.02, 10.0, 20.0);
        assert!(within_radius(10.03, 20.02, 10.0, 20.0, d));
    }

    #[test]
    fn test_within_radius_just_beyond_boundary() {
        let d = distance_km(10.03, 20.02, 10.0, 20.0);
        assert!(!within_radius(10.03, 20.02, 10.0, 20.0, d - 1e-6));
    }

    #[test]
    fn test_within_radius_far_point() {
        // ~50 km north of the center
        assert!(!within_radius(10.45, 20.0, 10.0, 20.0, 10.0));
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(51.9, 4.1).is_ok());
        assert!(validate_coordinates(90.0, -180.0).is_ok());
        assert!(validate_coordinates(90.1, 0.0).is_err());
        assert!(validate_coordinates(0.0, 180.5).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
        assert!(validate_coordinates(0.0, f64::INFINITY).is_err());
    }
}
