//! Requesting user context.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The user a query is issued on behalf of.
///
/// The id feeds personalization on the service side; attributes are an
/// open map forwarded as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, serde_json::Value>,
}

impl User {
    /// Create a user with no attributes.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Attach an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// The user id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The attribute map.
    pub fn attributes(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_omitted_when_empty() {
        let json = serde_json::to_value(User::new("u-1")).unwrap();
        assert_eq!(json, serde_json::json!({"id": "u-1"}));
    }
}
