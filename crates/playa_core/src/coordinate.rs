//! Geographic coordinates
//!
//! Latitude/longitude in degrees, plus a sentinel meaning "no result".

use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// A point on the globe, latitude first.
///
/// Exact zero in either component is treated as invalid: no site on the
/// playa sits on the equator or the prime meridian, and lookup data uses
/// zeros as filler for missing positions.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// "No result". Latitude is outside its range, so it never validates.
    pub const INVALID: Coordinate = Coordinate {
        latitude: -180.0,
        longitude: -180.0,
    };

    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build from a GeoJSON position (`[longitude, latitude]`).
    pub const fn from_lon_lat(position: [f64; 2]) -> Self {
        Self::new(position[1], position[0])
    }

    /// In range, finite, and neither component exactly zero.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (MIN_LATITUDE..=MAX_LATITUDE).contains(&self.latitude)
            && (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&self.longitude)
            && self.latitude != 0.0
            && self.longitude != 0.0
    }

    /// `Some(self)` when valid.
    pub fn valid(self) -> Option<Self> {
        self.is_valid().then_some(self)
    }

    /// Collapse anything invalid onto [`Coordinate::INVALID`].
    pub fn normalized(self) -> Self {
        self.valid().unwrap_or(Self::INVALID)
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::INVALID
    }
}

impl From<Option<Coordinate>> for Coordinate {
    fn from(value: Option<Coordinate>) -> Self {
        value.map(Coordinate::normalized).unwrap_or(Self::INVALID)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_invalid_sentinel_never_validates() {
        assert!(!Coordinate::INVALID.is_valid());
        assert_eq!(Coordinate::default(), Coordinate::INVALID);
        assert_eq!(Coordinate::INVALID.valid(), None);
    }

    #[test]
    fn test_playa_coordinate_is_valid() {
        let coordinate = Coordinate::new(40.7901, -119.2199);
        assert!(coordinate.is_valid());
        assert_eq!(coordinate.normalized(), coordinate);
    }

    #[rstest]
    #[case(0.0, -119.2)]
    #[case(40.7, 0.0)]
    #[case(0.0, 0.0)]
    #[case(90.5, -119.2)]
    #[case(-91.0, -119.2)]
    #[case(40.7, 180.01)]
    #[case(40.7, -181.0)]
    #[case(f64::NAN, -119.2)]
    #[case(40.7, f64::INFINITY)]
    fn test_rejected_coordinates(#[case] latitude: f64, #[case] longitude: f64) {
        let coordinate = Coordinate::new(latitude, longitude);
        assert!(!coordinate.is_valid());
        assert_eq!(coordinate.normalized(), Coordinate::INVALID);
    }

    #[rstest]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(1e-9, -1e-9)]
    fn test_boundaries_are_valid(#[case] latitude: f64, #[case] longitude: f64) {
        assert!(Coordinate::new(latitude, longitude).is_valid());
    }

    #[test]
    fn test_lon_lat_order_is_swapped() {
        let coordinate = Coordinate::from_lon_lat([-119.21, 40.78]);
        assert_eq!(coordinate.latitude, 40.78);
        assert_eq!(coordinate.longitude, -119.21);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Coordinate::from(None), Coordinate::INVALID);
        assert_eq!(
            Coordinate::from(Some(Coordinate::new(0.0, 0.0))),
            Coordinate::INVALID
        );
    }
}
