//! Decoded facet buckets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};
use crate::metadata;
use crate::wire;

/// The decoded identity of one facet bucket.
///
/// `id` is the bucket identity; `name`, `slug` and `level` are the
/// conventional companions for hierarchical facets. Any other key decoded
/// from the facet token is preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterValues {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl CounterValues {
    fn from_decoded(mut decoded: BTreeMap<String, String>) -> Option<Self> {
        let id = decoded.remove("id")?;
        let name = decoded.remove("name");
        let slug = decoded.remove("slug");
        let level = decoded.remove("level").and_then(|l| l.parse().ok());
        let extra = decoded
            .into_iter()
            .map(|(key, value)| (key, serde_json::Value::String(value)))
            .collect();

        Some(Self {
            id,
            name,
            slug,
            level,
            extra,
        })
    }
}

/// One decoded facet bucket: identity, hit count and selection state.
///
/// Wire form `{values, n, used?}`. A bucket with a zero count is never
/// materialized as a counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    values: CounterValues,
    n: u64,
    #[serde(default, skip_serializing_if = "wire::is_false")]
    used: bool,
}

impl Counter {
    /// Decode a raw bucket key into a counter, marking it used when its id
    /// is among the active-element identifiers.
    ///
    /// Returns `None` when the key is not a valid facet token.
    pub fn by_active_elements(bucket_key: &str, n: u64, active_elements: &[String]) -> Option<Self> {
        let values = CounterValues::from_decoded(metadata::decode(bucket_key)?)?;
        let used = active_elements.iter().any(|id| *id == values.id);

        Some(Self { values, n, used })
    }

    /// The bucket identity.
    pub fn id(&self) -> &str {
        &self.values.id
    }

    /// The display name, when the token carried one.
    pub fn name(&self) -> Option<&str> {
        self.values.name.as_deref()
    }

    /// The slug, when the token carried one.
    pub fn slug(&self) -> Option<&str> {
        self.values.slug.as_deref()
    }

    /// The hierarchical level, zero when the token carried none.
    pub fn level(&self) -> i64 {
        self.values.level.unwrap_or(0)
    }

    /// The full decoded identity.
    pub fn values(&self) -> &CounterValues {
        &self.values
    }

    /// True when this bucket is currently selected.
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// The hit count.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Decode from a wire value, failing fast on a malformed shape.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| ProtocolError::invalid_format(format!("malformed counter: {e}")))
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
    fn test_by_active_elements_decodes_token() {
        let counter =
            Counter::by_active_elements("id##5~~name##Shoes~~level##2", 10, &["5".to_string()])
                .unwrap();
        assert_eq!(counter.id(), "5");
        assert_eq!(counter.name(), Some("Shoes"));
        assert_eq!(counter.level(), 2);
        assert_eq!(counter.n(), 10);
        assert!(counter.is_used());
    }

    #[test]
    fn test_unselected_counter_is_not_used() {
        let counter = Counter::by_active_elements("id##5", 3, &["9".to_string()]).unwrap();
        assert!(!counter.is_used());
    }

    #[test]
    fn test_invalid_token_yields_none() {
        assert!(Counter::by_active_elements("name##Shoes", 3, &[]).is_none());
        assert!(Counter::by_active_elements("", 3, &[]).is_none());
    }

    #[test]
    fn test_wire_round_trip_keeps_used_flag() {
        let counter = Counter::by_active_elements("id##5~~name##Shoes", 7, &["5".to_string()])
            .unwrap();
        let value = counter.to_value();
        assert_eq!(value["used"], serde_json::json!(true));
        assert_eq!(Counter::from_value(&value).unwrap(), counter);
    }

    #[test]
    fn test_used_omitted_when_false() {
        let counter = Counter::by_active_elements("id##5", 7, &[]).unwrap();
        assert!(counter.to_value().get("used").is_none());
    }

    #[test]
    fn test_extra_keys_preserved() {
        let counter = Counter::by_active_elements("id##5~~color##red", 1, &[]).unwrap();
        assert_eq!(
            counter.values().extra.get("color").unwrap(),
            &serde_json::json!("red")
        );
    }
}
