//! Request-side aggregation (facet request).

use serde::{Deserialize, Serialize};

use crate::application::{ApplicationType, FilterType};
use crate::error::{ProtocolError, Result};
use crate::filter::{default_field, is_default_field, Filter};
use crate::wire;

/// Result-size limit meaning "no limit".
pub const AGGREGATION_NO_LIMIT: u64 = 0;

/// Order in which a facet's buckets are returned.
///
/// Carried on the wire as the service's two-element sort array, e.g.
/// `["_count", "desc"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "(String, String)", try_from = "(String, String)")]
pub enum AggregationSort {
    /// Highest bucket count first. This is the wire default.
    #[default]
    CountDesc,
    /// Lowest bucket count first.
    CountAsc,
    /// Bucket term ascending.
    NameAsc,
    /// Bucket term descending.
    NameDesc,
}

impl AggregationSort {
    /// True at the wire default, used to omit the key on encode.
    pub fn is_default(&self) -> bool {
        *self == AggregationSort::default()
    }
}

impl From<AggregationSort> for (String, String) {
    fn from(sort: AggregationSort) -> Self {
        let (field, order) = match sort {
            AggregationSort::CountDesc => ("_count", "desc"),
            AggregationSort::CountAsc => ("_count", "asc"),
            AggregationSort::NameAsc => ("_term", "asc"),
            AggregationSort::NameDesc => ("_term", "desc"),
        };
        (field.to_string(), order.to_string())
    }
}

impl TryFrom<(String, String)> for AggregationSort {
    type Error = ProtocolError;

    fn try_from(value: (String, String)) -> Result<Self> {
        match (value.0.as_str(), value.1.as_str()) {
            ("_count", "desc") => Ok(AggregationSort::CountDesc),
            ("_count", "asc") => Ok(AggregationSort::CountAsc),
            ("_term", "asc") => Ok(AggregationSort::NameAsc),
            ("_term", "desc") => Ok(AggregationSort::NameDesc),
            (field, order) => Err(ProtocolError::invalid_format(format!(
                "unknown aggregation sort: [{field}, {order}]"
            ))),
        }
    }
}

/// A facet request: name a dimension and ask for bucketed counts over it.
///
/// Defaults mirror [`Filter`] defaults so empty-valued construction is
/// idempotent on encode: omitted wire keys reconstruct to the same
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    name: String,
    #[serde(default = "default_field", skip_serializing_if = "is_default_field")]
    field: String,
    #[serde(default, skip_serializing_if = "ApplicationType::is_default")]
    application_type: ApplicationType,
    #[serde(default, skip_serializing_if = "FilterType::is_default")]
    filter_type: FilterType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    subgroup: Vec<String>,
    #[serde(default, skip_serializing_if = "AggregationSort::is_default")]
    sort: AggregationSort,
    #[serde(default, skip_serializing_if = "wire::is_zero_u64")]
    limit: u64,
}

impl Aggregation {
    /// Create an aggregation, resolving the field through the same
    /// canonical lookup filters use.
    pub fn create(
        name: impl Into<String>,
        field: &str,
        application_type: ApplicationType,
        filter_type: FilterType,
        subgroup: Vec<String>,
        sort: AggregationSort,
        limit: u64,
    ) -> Self {
        Self {
            name: name.into(),
            field: Filter::field_path(field),
            application_type,
            filter_type,
            subgroup,
            sort,
            limit,
        }
    }

    /// The facet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved field path.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// How selected values of this facet combine.
    pub fn application_type(&self) -> ApplicationType {
        self.application_type
    }

    /// The predicate kind the facet buckets over.
    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Optional sub-group path.
    pub fn subgroup(&self) -> &[String] {
        &self.subgroup
    }

    /// Bucket order.
    pub fn sort(&self) -> AggregationSort {
        self.sort
    }

    /// Result-size limit, [`AGGREGATION_NO_LIMIT`] for unlimited.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Decode from a wire value, failing fast on a malformed shape.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| ProtocolError::invalid_format(format!("malformed aggregation: {e}")))
    }

    /// Encode to a wire value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
