//! Protocol-level error types.
//!
//! Decoding failures fail fast at the boundary where malformed input is
//! first observed; there is no partial or best-effort decode. Construction
//! invariants (e.g. a geo-distance sort on a query without a coordinate)
//! fail at the call that violates them, not at encode time.

use thiserror::Error;

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised by the wire model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// A wire payload is missing required keys or has the wrong shape.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A query was built in a way that violates its invariants.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl ProtocolError {
    /// Create an invalid format error.
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        ProtocolError::InvalidFormat(msg.into())
    }

    /// Create an invalid query error.
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        ProtocolError::InvalidQuery(msg.into())
    }

    /// A composed item uuid was not of the form `id~type`.
    pub fn composed_uuid_not_valid() -> Self {
        Self::invalid_format("composed item uuid not valid, expected id~type")
    }

    /// A coordinate payload was missing `lat` or `lon`.
    pub fn coordinate_not_valid() -> Self {
        Self::invalid_format("coordinate not valid, expected {lat, lon}")
    }

    /// An item payload had a missing or ill-shaped uuid.
    pub fn item_uuid_not_valid() -> Self {
        Self::invalid_format("item uuid representation not valid")
    }

    /// A geo-distance sort was assigned to a query without a coordinate.
    pub fn sorted_by_distance_without_coordinate() -> Self {
        Self::invalid_query("sorting by geo distance requires a query coordinate")
    }
}
