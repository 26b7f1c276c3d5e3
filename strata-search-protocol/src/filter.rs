//! Request-side filter predicate.

use serde::{Deserialize, Serialize};

use crate::application::{ApplicationType, FilterType};
use crate::error::{ProtocolError, Result};

/// Field path used when the wire omits the `field` key.
pub const DEFAULT_FILTER_FIELD: &str = "uuid.type";

pub(crate) fn default_field() -> String {
    DEFAULT_FILTER_FIELD.to_string()
}

pub(crate) fn is_default_field(field: &String) -> bool {
    field == DEFAULT_FILTER_FIELD
}

/// A single request-side predicate: a field path, the values to match and
/// how they apply.
///
/// Immutable value object. The wire form
/// `{field, values, application_type, filter_type}` omits every key equal
/// to its documented default (`uuid.type` / empty / at-least-one / field)
/// and decoding restores exactly those defaults, so encode/decode is a
/// canonicalizing two-way transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default = "default_field", skip_serializing_if = "is_default_field")]
    field: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    values: Vec<String>,
    #[serde(default, skip_serializing_if = "ApplicationType::is_default")]
    application_type: ApplicationType,
    #[serde(default, skip_serializing_if = "FilterType::is_default")]
    filter_type: FilterType,
}

impl Filter {
    /// Create a filter from an already resolved field path.
    pub fn create(
        field: impl Into<String>,
        values: Vec<String>,
        application_type: ApplicationType,
        filter_type: FilterType,
    ) -> Self {
        Self {
            field: field.into(),
            values,
            application_type,
            filter_type,
        }
    }

    /// Resolve a caller-facing field name to its canonical path.
    ///
    /// The built-in `id` and `type` fields live under the item uuid; every
    /// other field is indexed metadata.
    pub fn field_path(field: &str) -> String {
        match field {
            "id" => "uuid.id".to_string(),
            "type" => "uuid.type".to_string(),
            other => format!("indexed_metadata.{other}"),
        }
    }

    /// The resolved field path.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The values to match.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// How the values combine.
    pub fn application_type(&self) -> ApplicationType {
        self.application_type
    }

    /// The predicate kind.
    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Decode from a wire value, failing fast on a malformed shape.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| ProtocolError::invalid_format(format!("malformed filter: {e}")))
    }

    /// Encode to a wire value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_lookup() {
        assert_eq!(Filter::field_path("id"), "uuid.id");
        assert_eq!(Filter::field_path("type"), "uuid.type");
        assert_eq!(Filter::field_path("brand"), "indexed_metadata.brand");
    }

    #[test]
    fn test_defaults_omitted_on_encode() {
        let filter = Filter::create(
            DEFAULT_FILTER_FIELD,
            vec![],
            ApplicationType::AtLeastOne,
            FilterType::Field,
        );
        assert_eq!(filter.to_value(), serde_json::json!({}));
    }

    #[test]
    fn test_decode_restores_defaults() {
        let filter = Filter::from_value(&serde_json::json!({})).unwrap();
        assert_eq!(filter.field(), DEFAULT_FILTER_FIELD);
        assert!(filter.values().is_empty());
        assert_eq!(filter.application_type(), ApplicationType::AtLeastOne);
        assert_eq!(filter.filter_type(), FilterType::Field);
    }

    #[test]
    fn test_canonical_round_trip() {
        let filter = Filter::create(
            "indexed_metadata.brand",
            vec!["acme".to_string()],
            ApplicationType::MustAll,
            FilterType::Field,
        );
        let encoded = filter.to_value();
        let decoded = Filter::from_value(&encoded).unwrap();
        assert_eq!(decoded, filter);
        assert_eq!(decoded.to_value(), encoded);
    }

    #[test]
    fn test_malformed_values_fail() {
        let result = Filter::from_value(&serde_json::json!({"values": "not-a-list"}));
        assert!(result.is_err());
    }
}
