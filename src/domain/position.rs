//! Geographic positions and great-circle distance.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::FeedError;

/// Mean Earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    /// Latitude in degrees, `-90.0..=90.0`.
    pub latitude: f64,
    /// Longitude in degrees, `-180.0..=180.0`.
    pub longitude: f64,
}

impl Position {
    /// Creates a position after checking both coordinates are finite and in
    /// range.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidPosition`] when either coordinate is NaN,
    /// infinite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, FeedError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(FeedError::InvalidPosition(format!(
                "latitude {latitude} outside -90..=90"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(FeedError::InvalidPosition(format!(
                "longitude {longitude} outside -180..=180"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle (haversine) distance to `other`, in meters.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();
        EARTH_RADIUS_METERS * c
    }
}

/// Formats a distance for display: whole meters below 1 km, otherwise
/// kilometers with one decimal (`"850 m"`, `"1.2 km"`).
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters < 1_000.0 {
        format!("{meters:.0} m")
    } else {
        format!("{:.1} km", meters / 1_000.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn pos(lat: f64, lng: f64) -> Position {
        let Ok(p) = Position::new(lat, lng) else {
            panic!("valid position");
        };
        p
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        assert!(matches!(
            Position::new(91.0, 0.0),
            Err(FeedError::InvalidPosition(_))
        ));
        assert!(Position::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        assert!(Position::new(0.0, 180.5).is_err());
        assert!(Position::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = pos(52.52, 13.405);
        assert!(p.distance_to(&p).abs() < f64::EPSILON);
    }

    #[test]
    fn sf_to_oakland_is_about_13km() {
        let sf = pos(37.7749, -122.4194);
        let oakland = pos(37.8044, -122.2712);
        let dist = sf.distance_to(&oakland);
        assert!((dist - 13_000.0).abs() < 2_000.0, "got {dist}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = pos(48.8566, 2.3522);
        let b = pos(51.5074, -0.1278);
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-6);
    }

    #[test]
    fn format_distance_switches_units() {
        assert_eq!(format_distance(850.4), "850 m");
        assert_eq!(format_distance(1_234.0), "1.2 km");
    }
}
