//! Sort criteria.
//!
//! A query sorts by an ordered list of criteria. The implicit default is
//! relevance (score) order, which is never carried on the wire.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::filter::Filter;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

/// How a multi-valued nested field collapses to one sortable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Avg,
    Sum,
    Min,
    Max,
    Median,
}

impl Mode {
    fn is_default(&self) -> bool {
        *self == Mode::default()
    }
}

fn default_unit() -> String {
    "km".to_string()
}

fn is_default_unit(unit: &String) -> bool {
    unit == "km"
}

/// One sort criterion, wire-tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SortCriterion {
    /// Relevance order. Implicit when no criteria are set.
    Score,
    /// Service-side random order.
    Random,
    /// Order by a field value.
    Field { field: String, order: Order },
    /// Order by a nested field, collapsed with `mode`.
    NestedField {
        field: String,
        order: Order,
        #[serde(default, skip_serializing_if = "Mode::is_default")]
        mode: Mode,
    },
    /// Order by a nested field over the subset matching `filter`.
    NestedFieldWithFilter {
        field: String,
        order: Order,
        #[serde(default, skip_serializing_if = "Mode::is_default")]
        mode: Mode,
        filter: Filter,
    },
    /// Order by distance from the query coordinate.
    ///
    /// The coordinate is attached by the query at sort-assignment time and
    /// travels with the criterion on the wire.
    GeoDistance {
        order: Order,
        #[serde(default = "default_unit", skip_serializing_if = "is_default_unit")]
        unit: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        coordinate: Option<Coordinate>,
    },
}

impl SortCriterion {
    /// Ascending id order.
    pub fn id_asc() -> Self {
        SortCriterion::Field {
            field: "uuid.id".to_string(),
            order: Order::Asc,
        }
    }

    /// Ascending type order.
    pub fn type_asc() -> Self {
        SortCriterion::Field {
            field: "uuid.type".to_string(),
            order: Order::Asc,
        }
    }

    /// Ascending distance in kilometres.
    pub fn geo_distance_km_asc() -> Self {
        SortCriterion::GeoDistance {
            order: Order::Asc,
            unit: "km".to_string(),
            coordinate: None,
        }
    }

    /// Ascending distance in miles.
    pub fn geo_distance_mi_asc() -> Self {
        SortCriterion::GeoDistance {
            order: Order::Asc,
            unit: "mi".to_string(),
            coordinate: None,
        }
    }
}

/// An ordered list of sort criteria.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortBy {
    criteria: Vec<SortCriterion>,
}

impl SortBy {
    /// Create an empty sort, resolving to the implicit score order.
    pub fn create() -> Self {
        Self::default()
    }

    /// Append a criterion. Score is the implicit default and is skipped.
    pub fn by_value(mut self, criterion: SortCriterion) -> Self {
        if criterion != SortCriterion::Score {
            self.criteria.push(criterion);
        }

        self
    }

    /// Append a field-value criterion for a metadata field.
    pub fn by_field_value(self, field: &str, order: Order) -> Self {
        self.by_value(SortCriterion::Field {
            field: format!("indexed_metadata.{field}"),
            order,
        })
    }

    /// Append a nested-field criterion for a metadata field.
    pub fn by_nested_field(self, field: &str, order: Order, mode: Mode) -> Self {
        self.by_value(SortCriterion::NestedField {
            field: format!("indexed_metadata.{field}"),
            order,
            mode,
        })
    }

    /// Append a filtered nested-field criterion for a metadata field.
    pub fn by_nested_field_and_filter(
        self,
        field: &str,
        order: Order,
        mode: Mode,
        filter: Filter,
    ) -> Self {
        self.by_value(SortCriterion::NestedFieldWithFilter {
            field: format!("indexed_metadata.{field}"),
            order,
            mode,
            filter,
        })
    }

    /// All criteria, resolving the empty sort to the implicit score order.
    pub fn all(&self) -> Vec<SortCriterion> {
        if self.criteria.is_empty() {
            vec![SortCriterion::Score]
        } else {
            self.criteria.clone()
        }
    }

    /// True when any criterion sorts by geo distance.
    pub fn is_sorted_by_geo_distance(&self) -> bool {
        self.criteria
            .iter()
            .any(|c| matches!(c, SortCriterion::GeoDistance { .. }))
    }

    /// True when any criterion is the random sort.
    pub fn has_random_sort(&self) -> bool {
        self.criteria.contains(&SortCriterion::Random)
    }

    /// Attach a coordinate to every geo-distance criterion.
    pub fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        for criterion in &mut self.criteria {
            if let SortCriterion::GeoDistance {
                coordinate: slot, ..
            } = criterion
            {
                *slot = Some(coordinate);
            }
        }

        self
    }

    /// True when the sort resolves to the implicit score order, used to
    /// omit the key on encode.
    pub fn is_default(&self) -> bool {
        self.criteria.is_empty() || self.criteria == [SortCriterion::Score]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ApplicationType, FilterType};

    #[test]
    fn test_empty_sort_resolves_to_score() {
        let sort = SortBy::create();
        assert_eq!(sort.all(), vec![SortCriterion::Score]);
        assert!(sort.is_default());
    }

    #[test]
    fn test_score_is_never_pushed() {
        let sort = SortBy::create().by_value(SortCriterion::Score);
        assert!(sort.is_default());
    }

    #[test]
    fn test_field_sort_wire_form() {
        let sort = SortBy::create().by_field_value("price", Order::Desc);
        let json = serde_json::to_value(&sort).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"kind": "field", "field": "indexed_metadata.price", "order": "desc"}
            ])
        );
    }

    #[test]
    fn test_nested_field_default_mode_omitted() {
        let sort = SortBy::create().by_nested_field("rating", Order::Asc, Mode::Avg);
        let json = serde_json::to_value(&sort).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"kind": "nested_field", "field": "indexed_metadata.rating", "order": "asc"}
            ])
        );
    }

    #[test]
    fn test_nested_field_with_filter_round_trip() {
        let filter = Filter::create(
            "indexed_metadata.stock",
            vec!["1..".to_string()],
            ApplicationType::MustAll,
            FilterType::Range,
        );
        let sort =
            SortBy::create().by_nested_field_and_filter("rating", Order::Desc, Mode::Max, filter);
        let json = serde_json::to_value(&sort).unwrap();
        let parsed: SortBy = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, sort);
    }

    #[test]
    fn test_geo_distance_detection_and_coordinate() {
        let sort = SortBy::create().by_value(SortCriterion::geo_distance_km_asc());
        assert!(sort.is_sorted_by_geo_distance());

        let located = sort.with_coordinate(Coordinate::new(1.0, 2.0));
        let json = serde_json::to_value(&located).unwrap();
        assert_eq!(json[0]["coordinate"], serde_json::json!({"lat": 1.0, "lon": 2.0}));
    }

    #[test]
    fn test_random_sort_detection() {
        assert!(SortBy::create()
            .by_value(SortCriterion::Random)
            .has_random_sort());
        assert!(!SortBy::create().has_random_sort());
    }
}
