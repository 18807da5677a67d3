//! Geodesic helpers for entry deduplication and spatial range queries.
//!
//! Distances use the haversine great-circle formula on the mean Earth radius.
//! The SQL function `great_circle_meters` in the migrations computes the same
//! value so that Rust-side checks and database filters agree.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Meters, Miles};

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_METERS: Meters = 6_371_008.8;

/// Conversion factor used by the feed's radius parameter.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Meters spanned by one degree of latitude on the mean sphere.
const METERS_PER_DEGREE: f64 = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoreError::Validation(format!(
                "latitude must be between -90 and 90, got {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoreError::Validation(format!(
                "longitude must be between -180 and 180, got {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Great-circle distance between two points in meters.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> Meters {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Convert a radius in miles to meters.
pub fn miles_to_meters(miles: Miles) -> Meters {
    miles * METERS_PER_MILE
}

/// A geographic bounding box in decimal degrees.
///
/// When `west > east` the box crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    /// Check that the edges are finite, in range, and that `south <= north`.
    pub fn validate(&self) -> Result<(), CoreError> {
        Coordinate::new(self.north, self.east)?;
        Coordinate::new(self.south, self.west)?;
        if self.south > self.north {
            return Err(CoreError::Validation(format!(
                "south ({}) must not exceed north ({})",
                self.south, self.north
            )));
        }
        Ok(())
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        let lat_ok = point.latitude >= self.south && point.latitude <= self.north;
        let lng_ok = if self.crosses_antimeridian() {
            point.longitude >= self.west || point.longitude <= self.east
        } else {
            point.longitude >= self.west && point.longitude <= self.east
        };
        lat_ok && lng_ok
    }

    /// Smallest axis-aligned box that contains every point within
    /// `radius_meters` of `center`.
    ///
    /// Used as an index-friendly prefilter ahead of the exact distance test.
    /// Near the poles the longitude span degrades to the full circle.
    pub fn around(center: Coordinate, radius_meters: Meters) -> Self {
        let lat_delta = radius_meters / METERS_PER_DEGREE;
        let north = (center.latitude + lat_delta).min(90.0);
        let south = (center.latitude - lat_delta).max(-90.0);

        let widest_lat = north.abs().max(south.abs());
        let cos_lat = widest_lat.to_radians().cos();
        let lng_delta = if cos_lat <= f64::EPSILON {
            180.0
        } else {
            lat_delta / cos_lat
        };

        if lng_delta >= 180.0 || widest_lat >= 90.0 {
            return Self {
                north,
                south,
                east: 180.0,
                west: -180.0,
            };
        }

        Self {
            north,
            south,
            east: wrap_longitude(center.longitude + lng_delta),
            west: wrap_longitude(center.longitude - lng_delta),
        }
    }
}

/// Normalize a longitude into `[-180, 180]`.
fn wrap_longitude(lng: f64) -> f64 {
    if lng > 180.0 {
        lng - 360.0
    } else if lng < -180.0 {
        lng + 360.0
    } else {
        lng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = point(37.77, -122.42);
        assert_eq!(distance_meters(p, p), 0.0);
    }

    #[test]
    fn test_distance_san_francisco_to_los_angeles() {
        let sf = point(37.7749, -122.4194);
        let la = point(34.0522, -118.2437);
        let km = distance_meters(sf, la) / 1000.0;
        assert!((km - 559.0).abs() < 2.0, "expected ~559 km, got {km}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = point(40.7128, -74.0060);
        let b = point(51.5074, -0.1278);
        let ab = distance_meters(a, b);
        let ba = distance_meters(b, a);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn test_thirty_meters_north_is_inside_duplicate_radius() {
        let a = point(37.77, -122.42);
        let b = point(37.77 + 30.0 / METERS_PER_DEGREE, -122.42);
        let d = distance_meters(a, b);
        assert!((d - 30.0).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_coordinate_rejects_out_of_range() {
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_miles_to_meters() {
        assert!((miles_to_meters(10.0) - 16_093.4).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_validate_rejects_inverted_latitudes() {
        let b = Bounds {
            north: 10.0,
            south: 20.0,
            east: 5.0,
            west: -5.0,
        };
        assert!(b.validate().is_err());
    }

    #[test]
    fn test_bounds_contains_regular_box() {
        let b = Bounds {
            north: 38.0,
            south: 37.0,
            east: -122.0,
            west: -123.0,
        };
        assert!(b.contains(point(37.77, -122.42)));
        assert!(!b.contains(point(36.9, -122.42)));
        assert!(!b.contains(point(37.5, -121.9)));
    }

    #[test]
    fn test_bounds_contains_across_antimeridian() {
        let b = Bounds {
            north: 10.0,
            south: -10.0,
            east: -170.0,
            west: 170.0,
        };
        assert!(b.crosses_antimeridian());
        assert!(b.contains(point(0.0, 175.0)));
        assert!(b.contains(point(0.0, -175.0)));
        assert!(!b.contains(point(0.0, 0.0)));
    }

    #[test]
    fn test_around_contains_points_on_the_circle() {
        let center = point(37.77, -122.42);
        let radius = 5_000.0;
        let b = Bounds::around(center, radius);

        for bearing_deg in (0..360).step_by(15) {
            let bearing = f64::from(bearing_deg).to_radians();
            let d_lat = radius * bearing.cos() / METERS_PER_DEGREE;
            let d_lng =
                radius * bearing.sin() / (METERS_PER_DEGREE * center.latitude.to_radians().cos());
            let p = point(center.latitude + d_lat, center.longitude + d_lng);
            assert!(b.contains(p), "box should contain {p:?}");
        }
    }

    #[test]
    fn test_around_near_pole_spans_all_longitudes() {
        let b = Bounds::around(point(89.9999, 10.0), 1_000.0);
        assert_eq!(b.west, -180.0);
        assert_eq!(b.east, 180.0);
        assert_eq!(b.north, 90.0);
    }

    #[test]
    fn test_around_wraps_at_antimeridian() {
        let b = Bounds::around(point(0.0, 179.9999), 1_000.0);
        assert!(b.crosses_antimeridian());
        assert!(b.contains(point(0.0, -179.9999)));
    }
}
