//! End-to-end wire round trips over realistic payloads.

use strata_search_protocol::{
    AggregationSort, ApplicationType, Coordinate, ItemUuid, Query, ScoreStrategy, SearchResult,
    SortBy, SortCriterion, User,
};

fn full_query() -> Query {
    Query::located(Coordinate::new(40.4168, -3.7038), "running shoes", 2, 24)
        .filter_by_types(
            vec!["product".to_string()],
            true,
            AggregationSort::CountDesc,
        )
        .filter_by(
            "category",
            "category",
            vec!["5".to_string()],
            ApplicationType::MustAllWithLevels,
            true,
            AggregationSort::CountDesc,
        )
        .filter_by_range(
            "price",
            "price",
            vec!["0..50".to_string(), "50..100".to_string()],
            vec!["0..50".to_string()],
            ApplicationType::AtLeastOne,
            strata_search_protocol::FilterType::Range,
            true,
            AggregationSort::CountAsc,
        )
        .filter_universe_by(
            "store",
            vec!["madrid".to_string()],
            ApplicationType::MustAll,
        )
        .sort_by(SortBy::create().by_value(SortCriterion::geo_distance_km_asc()))
        .unwrap()
        .enable_suggestions()
        .enable_highlights()
        .promote_uuid(ItemUuid::new("featured", "product"))
        .exclude_uuid(ItemUuid::new("banned", "product"))
        .with_filter_fields(vec!["category".to_string(), "price".to_string()])
        .with_score_strategy(ScoreStrategy::custom_function("_score * doc.boost"))
        .by_user(User::new("u-42").with_attribute("segment", serde_json::json!("premium")))
}

#[test]
fn query_round_trip_is_byte_identical() {
    let query = full_query();

    let encoded = serde_json::to_string(&query.to_value()).unwrap();
    let decoded = Query::from_value(&serde_json::from_str(&encoded).unwrap()).unwrap();
    let re_encoded = serde_json::to_string(&decoded.to_value()).unwrap();

    assert_eq!(re_encoded, encoded);
    assert_eq!(decoded, query);
}

#[test]
fn query_wire_uses_documented_keys_only() {
    let value = full_query().to_value();
    let object = value.as_object().unwrap();

    let documented = [
        "q",
        "coordinate",
        "universe_filters",
        "filters",
        "aggregations",
        "sort",
        "page",
        "size",
        "results_enabled",
        "suggestions_enabled",
        "highlights_enabled",
        "aggregations_enabled",
        "filter_fields",
        "score_strategy",
        "user",
        "items_promoted",
    ];
    for key in object.keys() {
        assert!(documented.contains(&key.as_str()), "undocumented key {key}");
    }

    // The internal query filter never reaches the wire.
    assert!(object["filters"].get("_query").is_none());
}

#[test]
fn result_envelope_decodes_from_service_payload() {
    let payload = serde_json::json!({
        "query": {"q": "shoes", "size": 2},
        "total_items": 120,
        "total_hits": 118,
        "items": [
            {"uuid": {"id": "1", "type": "product"}, "distance": 0.4},
            {"uuid": {"id": "9", "type": "category"}},
        ],
        "aggregations": {
            "total_elements": 120,
            "aggregations": {
                "category": {
                    "name": "category",
                    "application_type": 5,
                    "highest_active_level": 1,
                    "active_elements": [
                        {"values": {"id": "5", "name": "Shoes", "level": 1}, "n": 118, "used": true}
                    ],
                    "counters": [
                        {"values": {"id": "8", "name": "Sneakers", "level": 2}, "n": 40}
                    ]
                }
            }
        },
        "suggests": ["running shoes"]
    });

    let result = SearchResult::from_value(&payload).unwrap();
    assert_eq!(result.query().query_text(), "shoes");
    assert_eq!(result.total_items(), 120);
    assert_eq!(result.items().len(), 2);
    assert_eq!(result.items_by_type("product").len(), 1);
    assert!(result.has_not_empty_aggregation("category"));

    let category = result.aggregation("category").unwrap();
    assert_eq!(category.highest_active_level(), 1);
    let active = category.active_elements();
    let deepest = active.get("0").unwrap().as_counter().unwrap();
    assert_eq!(deepest.name(), Some("Shoes"));

    // Canonical: re-encoding the decoded envelope is stable.
    let value = result.to_value();
    assert_eq!(SearchResult::from_value(&value).unwrap().to_value(), value);
}
