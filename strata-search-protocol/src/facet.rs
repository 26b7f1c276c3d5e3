//! Result-side facet resolution.
//!
//! The remote service returns each facet as raw `(bucket key, count)`
//! pairs. Folding them decides which values are *active* (currently
//! selected by the caller's filters) and which are *counters* (the next
//! selectable options), applying the level-pruning rule that produces
//! breadcrumb-style hierarchical faceting: only the depth right below the
//! deepest selected level stays selectable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::ApplicationType;
use crate::counter::Counter;
use crate::error::{ProtocolError, Result};
use crate::wire;

/// An active facet element: a decoded counter for hierarchical facets, or
/// the bare selected identifier otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActiveElement {
    Counter(Counter),
    Raw(String),
}

impl ActiveElement {
    /// The element identity.
    pub fn id(&self) -> &str {
        match self {
            ActiveElement::Counter(counter) => counter.id(),
            ActiveElement::Raw(id) => id,
        }
    }

    /// The decoded counter, when this element is one.
    pub fn as_counter(&self) -> Option<&Counter> {
        match self {
            ActiveElement::Counter(counter) => Some(counter),
            ActiveElement::Raw(_) => None,
        }
    }
}

/// One resolved facet of a search result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultAggregation {
    name: String,
    application_type: ApplicationType,
    total_elements: u64,
    active_elements: BTreeMap<String, ActiveElement>,
    counters: BTreeMap<String, Counter>,
    highest_active_level: i64,
}

impl ResultAggregation {
    /// Create a facet ready to fold raw buckets.
    ///
    /// `active_element_ids` are the bucket identifiers present in the
    /// request's filter values for this facet; they mark which values are
    /// selected.
    pub fn new(
        name: impl Into<String>,
        application_type: ApplicationType,
        total_elements: u64,
        active_element_ids: Vec<String>,
    ) -> Self {
        let active_elements = active_element_ids
            .into_iter()
            .map(|id| (id.clone(), ActiveElement::Raw(id)))
            .collect();

        Self {
            name: name.into(),
            application_type,
            total_elements,
            active_elements,
            counters: BTreeMap::new(),
            highest_active_level: 0,
        }
    }

    /// Fold one raw bucket.
    ///
    /// Zero-count buckets and keys that do not decode as facet tokens are
    /// discarded. Used counters of a hierarchical facet become active
    /// elements and raise the highest active level; everything else lands
    /// in the selectable counters.
    pub fn add_counter(&mut self, bucket_key: &str, n: u64) {
        if n == 0 {
            return;
        }

        let active_ids: Vec<String> = self.active_elements.keys().cloned().collect();
        let Some(counter) = Counter::by_active_elements(bucket_key, n, &active_ids) else {
            return;
        };

        if self.application_type.has_levels() && counter.is_used() {
            self.highest_active_level = self.highest_active_level.max(counter.level());
            self.active_elements
                .insert(counter.id().to_string(), ActiveElement::Counter(counter));
            return;
        }

        self.counters.insert(counter.id().to_string(), counter);
    }

    /// Prune counters to the next drill-down depth: only entries one level
    /// below the deepest selected level stay.
    pub fn clean_counters_by_level(&mut self) {
        let next_level = self.highest_active_level + 1;
        self.counters.retain(|_, counter| counter.level() == next_level);
    }

    /// The facet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How selected values of this facet combine.
    pub fn application_type(&self) -> ApplicationType {
        self.application_type
    }

    /// The selectable options.
    pub fn counters(&self) -> &BTreeMap<String, Counter> {
        &self.counters
    }

    /// One selectable option by identity.
    pub fn counter(&self, id: &str) -> Option<&Counter> {
        self.counters.get(id)
    }

    /// The currently selected elements.
    ///
    /// A purely hierarchical facet collapses to its deepest selection,
    /// keyed at position 0; any other facet returns the full map.
    pub fn active_elements(&self) -> BTreeMap<String, ActiveElement> {
        if self.active_elements.is_empty() {
            return BTreeMap::new();
        }

        if self.application_type == ApplicationType::MustAllWithLevels {
            let deepest = self
                .active_elements
                .values()
                .filter_map(ActiveElement::as_counter)
                .max_by_key(|counter| counter.level());

            return match deepest {
                Some(counter) => BTreeMap::from([(
                    "0".to_string(),
                    ActiveElement::Counter(counter.clone()),
                )]),
                None => BTreeMap::new(),
            };
        }

        self.active_elements.clone()
    }

    /// Active elements and counters merged; counters win on identity clash.
    pub fn all_elements(&self) -> BTreeMap<String, ActiveElement> {
        let mut all = self.active_elements.clone();
        for (id, counter) in &self.counters {
            all.insert(id.clone(), ActiveElement::Counter(counter.clone()));
        }

        all
    }

    /// The bucket count reported by the service.
    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    /// The deepest selected level found while folding.
    pub fn highest_active_level(&self) -> i64 {
        self.highest_active_level
    }

    /// True when this facet belongs to a must-match-all filter.
    pub fn is_filter(&self) -> bool {
        self.application_type.matches_all()
    }

    /// True when this facet drills down through hierarchical levels.
    pub fn has_levels(&self) -> bool {
        self.application_type.has_levels()
    }

    /// True when nothing is selected and nothing is selectable.
    pub fn is_empty(&self) -> bool {
        self.active_elements.is_empty() && self.counters.is_empty()
    }

    /// Decode from a wire value, failing fast on a malformed shape.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|e| {
            ProtocolError::invalid_format(format!("malformed result aggregation: {e}"))
        })
    }

    /// Encode to a wire value.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Wire form of [`ResultAggregation`]: maps flatten to arrays and the
/// OR / 0 / 0 defaults are omitted.
#[derive(Serialize, Deserialize)]
struct ResultAggregationWire {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    counters: Vec<Counter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    active_elements: Vec<ActiveElement>,
    #[serde(default, skip_serializing_if = "ApplicationType::is_default")]
    application_type: ApplicationType,
    #[serde(default, skip_serializing_if = "wire::is_zero_u64")]
    total_elements: u64,
    #[serde(default, skip_serializing_if = "wire::is_zero_i64")]
    highest_active_level: i64,
}

impl From<&ResultAggregation> for ResultAggregationWire {
    fn from(aggregation: &ResultAggregation) -> Self {
        ResultAggregationWire {
            name: aggregation.name.clone(),
            counters: aggregation.counters.values().cloned().collect(),
            active_elements: aggregation.active_elements.values().cloned().collect(),
            application_type: aggregation.application_type,
            total_elements: aggregation.total_elements,
            highest_active_level: aggregation.highest_active_level,
        }
    }
}

impl From<ResultAggregationWire> for ResultAggregation {
    fn from(wire: ResultAggregationWire) -> Self {
        let active_elements = wire
            .active_elements
            .into_iter()
            .map(|element| (element.id().to_string(), element))
            .collect();
        let counters = wire
            .counters
            .into_iter()
            .map(|counter| (counter.id().to_string(), counter))
            .collect();

        Self {
            name: wire.name,
            application_type: wire.application_type,
            total_elements: wire.total_elements,
            active_elements,
            counters,
            highest_active_level: wire.highest_active_level,
        }
    }
}

impl Serialize for ResultAggregation {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        ResultAggregationWire::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResultAggregation {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        ResultAggregationWire::deserialize(deserializer).map(Into::into)
    }
}

/// All named facets of a search result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Aggregations {
    #[serde(default, skip_serializing_if = "wire::is_zero_u64")]
    total_elements: u64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    aggregations: BTreeMap<String, ResultAggregation>,
}

impl Aggregations {
    /// Create an empty collection.
    pub fn new(total_elements: u64) -> Self {
        Self {
            total_elements,
            aggregations: BTreeMap::new(),
        }
    }

    /// Register a resolved facet under its name.
    pub fn add_aggregation(&mut self, name: impl Into<String>, aggregation: ResultAggregation) {
        self.aggregations.insert(name.into(), aggregation);
    }

    /// All facets by name.
    pub fn aggregations(&self) -> &BTreeMap<String, ResultAggregation> {
        &self.aggregations
    }

    /// One facet by name.
    pub fn aggregation(&self, name: &str) -> Option<&ResultAggregation> {
        self.aggregations.get(name)
    }

    /// True when the named facet exists and resolved to something.
    pub fn has_not_empty_aggregation(&self, name: &str) -> bool {
        self.aggregation(name).is_some_and(|a| !a.is_empty())
    }

    /// The total matched elements reported by the service.
    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hierarchical(active: &[&str]) -> ResultAggregation {
        ResultAggregation::new(
            "category",
            ApplicationType::MustAllWithLevels,
            0,
            active.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_used_hierarchical_bucket_becomes_active() {
        let mut aggregation = hierarchical(&["5"]);
        aggregation.add_counter("id##5~~name##Shoes~~level##1", 10);

        let active = aggregation.active_elements();
        let counter = active.get("0").unwrap().as_counter().unwrap();
        assert_eq!(counter.id(), "5");
        assert_eq!(aggregation.highest_active_level(), 1);
        assert!(aggregation.counters().is_empty());
    }

    #[test]
    fn test_level_pruning_keeps_next_depth_only() {
        let mut aggregation = hierarchical(&["5"]);
        aggregation.add_counter("id##5~~name##Shoes~~level##1", 10);
        // Direct children stay selectable, deeper descendants are pruned.
        aggregation.add_counter("id##8~~name##Sneakers~~level##2", 4);
        aggregation.add_counter("id##9~~name##Laces~~level##3", 2);
        aggregation.clean_counters_by_level();

        assert!(aggregation.counter("8").is_some());
        assert!(aggregation.counter("9").is_none());
    }

    #[test]
    fn test_zero_count_bucket_is_discarded() {
        for application_type in [
            ApplicationType::AtLeastOne,
            ApplicationType::MustAll,
            ApplicationType::MustAllWithLevels,
            ApplicationType::Exclude,
        ] {
            let mut aggregation =
                ResultAggregation::new("color", application_type, 0, vec!["red".to_string()]);
            aggregation.add_counter("id##red", 0);
            assert!(aggregation.counters().is_empty());
            assert!(aggregation.active_elements().get("0").is_none());
        }
    }

    #[test]
    fn test_undecodable_bucket_is_discarded() {
        let mut aggregation = hierarchical(&[]);
        aggregation.add_counter("name##Shoes", 5);
        assert!(aggregation.is_empty());
    }

    #[test]
    fn test_plain_facet_routes_used_buckets_to_counters() {
        let mut aggregation =
            ResultAggregation::new("color", ApplicationType::AtLeastOne, 0, vec!["red".to_string()]);
        aggregation.add_counter("id##red", 5);

        let counter = aggregation.counter("red").unwrap();
        assert!(counter.is_used());
        // Non-hierarchical active elements come back unchanged.
        assert_eq!(
            aggregation.active_elements().get("red").unwrap().id(),
            "red"
        );
    }

    #[test]
    fn test_is_empty_after_folding() {
        let mut aggregation = hierarchical(&[]);
        assert!(aggregation.is_empty());
        aggregation.add_counter("id##5~~level##1", 2);
        assert!(!aggregation.is_empty());
    }

    #[test]
    fn test_wire_round_trip() {
        let mut aggregation = hierarchical(&["5"]);
        aggregation.add_counter("id##5~~name##Shoes~~level##1", 10);
        aggregation.add_counter("id##8~~name##Sneakers~~level##2", 4);

        let value = aggregation.to_value();
        assert_eq!(value["application_type"], serde_json::json!(5));
        assert_eq!(value["highest_active_level"], serde_json::json!(1));

        let decoded = ResultAggregation::from_value(&value).unwrap();
        assert_eq!(decoded, aggregation);
        assert_eq!(decoded.to_value(), value);
    }

    #[test]
    fn test_raw_active_elements_serialize_as_strings() {
        let aggregation = ResultAggregation::new(
            "color",
            ApplicationType::AtLeastOne,
            0,
            vec!["red".to_string()],
        );
        let value = aggregation.to_value();
        assert_eq!(value["active_elements"], serde_json::json!(["red"]));
        // The OR default is omitted entirely.
        assert!(value.get("application_type").is_none());
    }

    #[test]
    fn test_aggregations_collection() {
        let mut aggregations = Aggregations::new(2);
        let mut facet = hierarchical(&[]);
        facet.add_counter("id##5~~level##1", 1);
        aggregations.add_aggregation("category", facet);
        aggregations.add_aggregation("empty", hierarchical(&[]));

        assert!(aggregations.has_not_empty_aggregation("category"));
        assert!(!aggregations.has_not_empty_aggregation("empty"));
        assert!(!aggregations.has_not_empty_aggregation("missing"));
    }
}
