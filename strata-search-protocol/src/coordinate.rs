//! Geographic coordinate.

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// A latitude/longitude pair, wire form `{lat, lon}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.lon
    }

    /// Decode from a wire value. Fails when `lat` or `lon` is absent.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|_| ProtocolError::coordinate_not_valid())
    }

    /// Encode to a wire value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({"lat": self.lat, "lon": self.lon})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_round_trip() {
        let coordinate = Coordinate::new(40.9, -70.0);
        let value = coordinate.to_value();
        assert_eq!(Coordinate::from_value(&value).unwrap(), coordinate);
    }

    #[test]
    fn test_missing_key_fails() {
        let value = serde_json::json!({"lat": 40.9});
        assert!(Coordinate::from_value(&value).is_err());
    }
}
