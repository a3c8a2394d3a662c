use common::helper::error_chain_fmt;
use serde::Serialize;

/// A validated WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Accepts only finite coordinates within the usual lat/lng bounds
    pub fn new(latitude: f64, longitude: f64) -> Result<GeoPoint, GeoPointError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoPointError::NotFinite(latitude, longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoPointError::OutOfBounds(latitude, longitude));
        }

        Ok(GeoPoint {
            latitude,
            longitude,
        })
    }
}

#[derive(thiserror::Error)]
pub enum GeoPointError {
    #[error("Coordinates must be finite numbers, got ({0}, {1})")]
    NotFinite(f64, f64),
    #[error("Coordinates ({0}, {1}) are outside the valid lat/lng range")]
    OutOfBounds(f64, f64),
}

impl std::fmt::Debug for GeoPointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
