//! Geographic point and bounding box types.

use serde::{Deserialize, Serialize};

use crate::error::GeoError;

/// Geographic point (lat/lng) in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create a validated coordinate.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        let coord = Self { lat, lng };
        coord.validate()?;
        Ok(coord)
    }

    /// Check that latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn validate(&self) -> Result<(), GeoError> {
        let lat_ok = self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat);
        let lng_ok = self.lng.is_finite() && (-180.0..=180.0).contains(&self.lng);
        if lat_ok && lng_ok {
            Ok(())
        } else {
            Err(GeoError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Rectangular region covered by a geohash cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// The whole globe, the starting bounds of every geohash bisection.
    pub const WORLD: BoundingBox = BoundingBox {
        lat_min: -90.0,
        lat_max: 90.0,
        lon_min: -180.0,
        lon_max: 180.0,
    };

    pub fn center(&self) -> Coordinate {
        Coordinate {
            lat: (self.lat_min + self.lat_max) / 2.0,
            lng: (self.lon_min + self.lon_max) / 2.0,
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    pub fn lon_span(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// Inclusive containment test.
    pub fn contains(&self, coord: &Coordinate) -> bool {
        coord.lat >= self.lat_min
            && coord.lat <= self.lat_max
            && coord.lng >= self.lon_min
            && coord.lng <= self.lon_max
    }
}
