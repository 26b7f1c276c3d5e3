//! Items and item identities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::error::{ProtocolError, Result};
use crate::wire;

/// Separator joining an item's id and type into its composed identity.
pub const COMPOSED_UUID_SEPARATOR: &str = "~";

/// An item's identity: id plus type, wire form `{id, type}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemUuid {
    id: String,
    #[serde(rename = "type")]
    item_type: String,
}

impl ItemUuid {
    /// Create an item identity.
    pub fn new(id: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type: item_type.into(),
        }
    }

    /// Parse a composed identity of the form `id~type`.
    pub fn from_composed_uuid(composed: &str) -> Result<Self> {
        let mut parts = composed.split(COMPOSED_UUID_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(id), Some(item_type), None) => Ok(Self::new(id, item_type)),
            _ => Err(ProtocolError::composed_uuid_not_valid()),
        }
    }

    /// The item id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The item type.
    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    /// The composed identity, `id~type`.
    pub fn composed_uuid(&self) -> String {
        format!("{}{}{}", self.id, COMPOSED_UUID_SEPARATOR, self.item_type)
    }
}

/// One searchable item as echoed back by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    uuid: ItemUuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coordinate: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    indexed_metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    searchable_metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    exact_matching_metadata: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    suggest: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    highlights: BTreeMap<String, serde_json::Value>,
    #[serde(
        rename = "is_promoted",
        default,
        skip_serializing_if = "wire::is_false"
    )]
    promoted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distance: Option<f64>,
}

impl Item {
    /// Create an item without a location.
    pub fn create(uuid: ItemUuid) -> Self {
        Self {
            uuid,
            coordinate: None,
            metadata: BTreeMap::new(),
            indexed_metadata: BTreeMap::new(),
            searchable_metadata: BTreeMap::new(),
            exact_matching_metadata: Vec::new(),
            suggest: Vec::new(),
            highlights: BTreeMap::new(),
            promoted: false,
            distance: None,
        }
    }

    /// Create a located item.
    pub fn create_located(uuid: ItemUuid, coordinate: Coordinate) -> Self {
        let mut item = Self::create(uuid);
        item.coordinate = Some(coordinate);
        item
    }

    /// Attach free-form metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Attach indexed (filterable) metadata.
    pub fn with_indexed_metadata(
        mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.indexed_metadata.insert(key.into(), value);
        self
    }

    /// Attach searchable metadata.
    pub fn with_searchable_metadata(
        mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.searchable_metadata.insert(key.into(), value);
        self
    }

    /// Attach an exact-matching value.
    pub fn with_exact_matching_metadata(mut self, value: impl Into<String>) -> Self {
        self.exact_matching_metadata.push(value.into());
        self
    }

    /// Attach a suggestion value.
    pub fn with_suggest(mut self, value: impl Into<String>) -> Self {
        self.suggest.push(value.into());
        self
    }

    /// The item identity.
    pub fn uuid(&self) -> &ItemUuid {
        &self.uuid
    }

    /// The item id.
    pub fn id(&self) -> &str {
        self.uuid.id()
    }

    /// The item type.
    pub fn item_type(&self) -> &str {
        self.uuid.item_type()
    }

    /// The composed identity, `id~type`.
    pub fn composed_uuid(&self) -> String {
        self.uuid.composed_uuid()
    }

    /// The item location, when indexed with one.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    /// Distance from the query coordinate, present on geo-sorted results.
    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    /// Free-form metadata.
    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    /// Indexed metadata.
    pub fn indexed_metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.indexed_metadata
    }

    /// Searchable metadata.
    pub fn searchable_metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.searchable_metadata
    }

    /// Exact-matching values.
    pub fn exact_matching_metadata(&self) -> &[String] {
        &self.exact_matching_metadata
    }

    /// Suggestion values.
    pub fn suggest(&self) -> &[String] {
        &self.suggest
    }

    /// Free-form and indexed metadata merged; indexed wins on key clash.
    pub fn all_metadata(&self) -> BTreeMap<String, serde_json::Value> {
        let mut all = self.metadata.clone();
        all.extend(self.indexed_metadata.clone());
        all
    }

    /// Look up one metadata value across both metadata maps.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.indexed_metadata
            .get(key)
            .or_else(|| self.metadata.get(key))
    }

    /// Highlighted fragments keyed by field.
    pub fn highlights(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.highlights
    }

    /// One highlighted fragment.
    pub fn highlight(&self, key: &str) -> Option<&serde_json::Value> {
        self.highlights.get(key)
    }

    /// True when the item was placed by promotion rather than relevance.
    pub fn is_promoted(&self) -> bool {
        self.promoted
    }

    /// Decode from a wire value, failing fast on a malformed shape.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        if !value.get("uuid").is_some_and(|u| u.is_object()) {
            return Err(ProtocolError::item_uuid_not_valid());
        }

        serde_json::from_value(value.clone())
            .map_err(|e| ProtocolError::invalid_format(format!("malformed item: {e}")))
    }

    /// Encode to a wire value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
