//! The search result envelope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};
use crate::facet::Aggregations;
use crate::item::Item;
use crate::query::Query;

/// Everything the service returns for one query: the query echo, matched
/// items, suggestions and resolved facets.
///
/// A result is immutable after construction; derived views such as the
/// per-type grouping are computed on demand, so they can never go stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    query: Query,
    #[serde(default)]
    total_items: u64,
    #[serde(default)]
    total_hits: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aggregations: Option<Aggregations>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    suggests: Vec<String>,
}

impl SearchResult {
    /// Create a result.
    pub fn create(
        query: Query,
        total_items: u64,
        total_hits: u64,
        aggregations: Option<Aggregations>,
        suggests: Vec<String>,
        items: Vec<Item>,
    ) -> Self {
        Self {
            query,
            total_items,
            total_hits,
            items,
            aggregations,
            suggests,
        }
    }

    /// The query this result answers.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The matched items, in result order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// The first matched item.
    pub fn first_item(&self) -> Option<&Item> {
        self.items.first()
    }

    /// The items grouped by type, in result order within each group.
    pub fn items_grouped_by_types(&self) -> BTreeMap<&str, Vec<&Item>> {
        let mut groups: BTreeMap<&str, Vec<&Item>> = BTreeMap::new();
        for item in &self.items {
            groups.entry(item.item_type()).or_default().push(item);
        }

        groups
    }

    /// The items of one type.
    pub fn items_by_type(&self, item_type: &str) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.item_type() == item_type)
            .collect()
    }

    /// The items of any of the given types.
    pub fn items_by_types(&self, types: &[&str]) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| types.contains(&item.item_type()))
            .collect()
    }

    /// The resolved facets, when the query requested them.
    pub fn aggregations(&self) -> Option<&Aggregations> {
        self.aggregations.as_ref()
    }

    /// One resolved facet by name.
    pub fn aggregation(&self, name: &str) -> Option<&crate::facet::ResultAggregation> {
        self.aggregations.as_ref()?.aggregation(name)
    }

    /// True when the named facet exists and resolved to something.
    pub fn has_not_empty_aggregation(&self, name: &str) -> bool {
        self.aggregations
            .as_ref()
            .is_some_and(|a| a.has_not_empty_aggregation(name))
    }

    /// The suggestion strings.
    pub fn suggests(&self) -> &[String] {
        &self.suggests
    }

    /// Total items matched by the query.
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Total hits before universe filtering.
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// Decode from a wire value, failing fast on a malformed shape.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| ProtocolError::invalid_format(format!("malformed result: {e}")))
    }

    /// Encode to a wire value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemUuid;

    fn result_with_items(items: Vec<Item>) -> SearchResult {
        let total = items.len() as u64;
        SearchResult::create(Query::match_all(), total, total, None, vec![], items)
    }

    #[test]
    fn test_grouping_is_computed_from_current_items() {
        let result = result_with_items(vec![
            Item::create(ItemUuid::new("1", "product")),
            Item::create(ItemUuid::new("2", "category")),
            Item::create(ItemUuid::new("3", "product")),
        ]);

        let groups = result.items_grouped_by_types();
        assert_eq!(groups.get("product").unwrap().len(), 2);
        assert_eq!(groups.get("category").unwrap().len(), 1);
        // Repeated computation sees the same immutable items.
        assert_eq!(result.items_grouped_by_types(), groups);

        assert_eq!(result.items_by_type("product").len(), 2);
        assert!(result.items_by_type("missing").is_empty());
        assert_eq!(result.items_by_types(&["product", "category"]).len(), 3);
    }

    #[test]
    fn test_first_item() {
        assert!(result_with_items(vec![]).first_item().is_none());
        let result = result_with_items(vec![Item::create(ItemUuid::new("1", "product"))]);
        assert_eq!(result.first_item().unwrap().id(), "1");
    }

    #[test]
    fn test_wire_round_trip() {
        let result = SearchResult::create(
            Query::create("shoes", 1, 10),
            2,
            5,
            Some(Aggregations::new(2)),
            vec!["shoes".to_string()],
            vec![Item::create(ItemUuid::new("1", "product"))],
        );

        let value = result.to_value();
        assert_eq!(value["total_items"], serde_json::json!(2));
        assert_eq!(value["total_hits"], serde_json::json!(5));

        let decoded = SearchResult::from_value(&value).unwrap();
        assert_eq!(decoded, result);
        assert_eq!(decoded.to_value(), value);
    }

    #[test]
    fn test_decode_tolerates_missing_collections() {
        let value = serde_json::json!({"query": {}, "total_items": 0, "total_hits": 0});
        let result = SearchResult::from_value(&value).unwrap();
        assert!(result.items().is_empty());
        assert!(result.suggests().is_empty());
        assert!(result.aggregations().is_none());
    }

    #[test]
    fn test_decode_without_query_fails() {
        assert!(SearchResult::from_value(&serde_json::json!({"total_items": 0})).is_err());
    }
}
