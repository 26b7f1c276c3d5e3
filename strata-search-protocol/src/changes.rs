//! Field-change descriptions for bulk item updates.
//!
//! A `Changes` value travels with a query in an update-items request and
//! describes edits applied to every matching item. Change kinds are
//! numeric on the wire and combine the value kind with the list operation.

use serde::{Deserialize, Serialize};

/// Assign a plain value.
pub const CHANGE_TYPE_VALUE: u32 = 1;

/// Assign a literal (unquoted server-side expression).
pub const CHANGE_TYPE_LITERAL: u32 = 4;

/// Update elements of a list field matching a condition.
pub const CHANGE_TYPE_ARRAY_ELEMENT_UPDATE: u32 = 8;

/// Append an element to a list field.
pub const CHANGE_TYPE_ARRAY_ELEMENT_ADD: u32 = 16;

/// Delete elements of a list field matching a condition.
pub const CHANGE_TYPE_ARRAY_ELEMENT_DELETE: u32 = 32;

/// One field change, wire form `{field, type, value?, condition?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    field: String,
    #[serde(rename = "type")]
    kind: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
}

impl Change {
    /// The field path the change applies to.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The numeric change kind.
    pub fn kind(&self) -> u32 {
        self.kind
    }

    /// The value assigned, when the change carries one.
    pub fn value(&self) -> Option<&serde_json::Value> {
        self.value.as_ref()
    }

    /// The list-element condition, when the change carries one.
    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }
}

/// An ordered list of field changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Changes {
    changes: Vec<Change>,
}

impl Changes {
    /// Create an empty change set.
    pub fn create() -> Self {
        Self::default()
    }

    /// Assign `value` to `field`.
    pub fn add_change(
        mut self,
        field: impl Into<String>,
        value: serde_json::Value,
        kind: u32,
    ) -> Self {
        self.changes.push(Change {
            field: field.into(),
            kind,
            value: Some(value),
            condition: None,
        });

        self
    }

    /// Update elements of the list `field` matching `condition`.
    pub fn update_element_from_list(
        mut self,
        field: impl Into<String>,
        condition: impl Into<String>,
        value: serde_json::Value,
        kind: u32,
    ) -> Self {
        self.changes.push(Change {
            field: field.into(),
            kind: kind | CHANGE_TYPE_ARRAY_ELEMENT_UPDATE,
            value: Some(value),
            condition: Some(condition.into()),
        });

        self
    }

    /// Append `value` to the list `field`.
    pub fn add_element_in_list(
        mut self,
        field: impl Into<String>,
        value: serde_json::Value,
        kind: u32,
    ) -> Self {
        self.changes.push(Change {
            field: field.into(),
            kind: kind | CHANGE_TYPE_ARRAY_ELEMENT_ADD,
            value: Some(value),
            condition: None,
        });

        self
    }

    /// Delete elements of the list `field` matching `condition`.
    pub fn delete_element_from_list(
        mut self,
        field: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        self.changes.push(Change {
            field: field.into(),
            kind: CHANGE_TYPE_ARRAY_ELEMENT_DELETE,
            value: None,
            condition: Some(condition.into()),
        });

        self
    }

    /// The accumulated changes.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// True when no changes were added.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_kinds_compose() {
        let changes = Changes::create()
            .add_change("stock", serde_json::json!(10), CHANGE_TYPE_VALUE)
            .add_element_in_list("tags", serde_json::json!("sale"), CHANGE_TYPE_VALUE)
            .delete_element_from_list("tags", "element == 'old'");

        assert_eq!(changes.changes()[0].kind(), CHANGE_TYPE_VALUE);
        assert_eq!(
            changes.changes()[1].kind(),
            CHANGE_TYPE_VALUE | CHANGE_TYPE_ARRAY_ELEMENT_ADD
        );
        assert_eq!(
            changes.changes()[2].kind(),
            CHANGE_TYPE_ARRAY_ELEMENT_DELETE
        );
    }

    #[test]
    fn test_wire_round_trip() {
        let changes = Changes::create()
            .add_change("price", serde_json::json!(9.99), CHANGE_TYPE_VALUE)
            .update_element_from_list(
                "variants",
                "element.size == 'M'",
                serde_json::json!({"stock": 0}),
                CHANGE_TYPE_VALUE,
            );

        let json = serde_json::to_value(&changes).unwrap();
        assert!(json.is_array());
        let parsed: Changes = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, changes);
    }
}
