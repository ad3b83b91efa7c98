//! Geographic point type

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// A latitude/longitude pair in degrees
///
/// ## Invariants
///
/// - `latitude` is finite and in `[-90, 90]`
/// - `longitude` is finite and in `[-180, 180]`
///
/// Equality compares both coordinates exactly as stored.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = Error;

    fn try_from(raw: RawGeoPoint) -> Result<Self> {
        GeoPoint::new(raw.latitude, raw.longitude)
    }
}

impl GeoPoint {
    /// Create a point, validating both coordinates
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::invalid_argument(format!(
                "Latitude must be in the range of [-90, 90], got {}",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::invalid_argument(format!(
                "Longitude must be in the range of [-180, 180], got {}",
                longitude
            )));
        }
        Ok(GeoPoint {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        GeoPoint {
            latitude: 0.0,
            longitude: 0.0,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GeoPoint {{ latitude={}, longitude={} }}",
            self.latitude, self.longitude
        )
    }
}
