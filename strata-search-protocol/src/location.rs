//! Geographic location ranges for universe filtering.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::error::{ProtocolError, Result};

/// An area of the map restricting the searchable universe.
///
/// Wire form `{type, data}` where `type` names the shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LocationRange {
    /// Everything within `distance` of a center coordinate. The distance
    /// carries its unit, e.g. `"10km"`.
    CoordinateAndDistance {
        coordinate: Coordinate,
        distance: String,
    },
    /// An axis-aligned box between two corners.
    Square {
        top_left: Coordinate,
        bottom_right: Coordinate,
    },
    /// An arbitrary polygon.
    Polygon { coordinates: Vec<Coordinate> },
}

impl LocationRange {
    /// The wire name of this shape.
    pub fn name(&self) -> &'static str {
        match self {
            LocationRange::CoordinateAndDistance { .. } => "CoordinateAndDistance",
            LocationRange::Square { .. } => "Square",
            LocationRange::Polygon { .. } => "Polygon",
        }
    }

    /// Decode from a wire value, failing fast on a malformed shape.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| ProtocolError::invalid_format(format!("malformed location range: {e}")))
    }

    /// Encode to a wire value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
