//! The search query and its fluent builders.
//!
//! A query aggregates filters, universe filters, facet requests, sorting,
//! pagination, promoted and excluded items, score strategy and user
//! context. Builders consume and return the query so construction reads as
//! one chain and no half-built query is ever shared:
//!
//! ```
//! use strata_search_protocol::{AggregationSort, ApplicationType, Query};
//!
//! let query = Query::create("shoes", 1, 20)
//!     .filter_by_types(vec!["product".to_string()], true, AggregationSort::CountDesc)
//!     .filter_by(
//!         "brand",
//!         "brand",
//!         vec!["acme".to_string()],
//!         ApplicationType::AtLeastOne,
//!         true,
//!         AggregationSort::CountDesc,
//!     )
//!     .enable_suggestions();
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregation::{Aggregation, AggregationSort, AGGREGATION_NO_LIMIT};
use crate::application::{ApplicationType, FilterType};
use crate::coordinate::Coordinate;
use crate::error::{ProtocolError, Result};
use crate::filter::Filter;
use crate::item::ItemUuid;
use crate::location::LocationRange;
use crate::score::ScoreStrategy;
use crate::sort::SortBy;
use crate::user::User;
use crate::wire;

/// First page number.
pub const QUERY_DEFAULT_PAGE: u64 = 1;

/// Default page size.
pub const QUERY_DEFAULT_SIZE: u64 = 10;

/// Page size used to fetch "everything".
pub const QUERY_INFINITE_SIZE: u64 = 1000;

/// Name of the internal filter holding the query text.
const QUERY_FILTER: &str = "_query";

/// Name of the filter holding excluded item ids.
const EXCLUDED_IDS_FILTER: &str = "excluded_ids";

/// A structured search request.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    coordinate: Option<Coordinate>,
    universe_filters: BTreeMap<String, Filter>,
    filters: BTreeMap<String, Filter>,
    aggregations: BTreeMap<String, Aggregation>,
    items_promoted: Vec<ItemUuid>,
    sort: SortBy,
    page: u64,
    from: u64,
    size: u64,
    results_enabled: bool,
    aggregations_enabled: bool,
    suggestions_enabled: bool,
    highlights_enabled: bool,
    filter_fields: Vec<String>,
    score_strategy: Option<ScoreStrategy>,
    user: Option<User>,
}

impl Query {
    /// Create a query over `text` with explicit pagination.
    ///
    /// The page is clamped to 1 and the result offset is always derived as
    /// `(page - 1) * size`.
    pub fn create(text: impl Into<String>, page: u64, size: u64) -> Self {
        let page = page.max(QUERY_DEFAULT_PAGE);
        let mut filters = BTreeMap::new();
        filters.insert(
            QUERY_FILTER.to_string(),
            Filter::create(
                "",
                vec![text.into()],
                ApplicationType::default(),
                FilterType::Query,
            ),
        );

        Self {
            coordinate: None,
            universe_filters: BTreeMap::new(),
            filters,
            aggregations: BTreeMap::new(),
            items_promoted: Vec::new(),
            sort: SortBy::create(),
            page,
            from: (page - 1) * size,
            size,
            results_enabled: true,
            aggregations_enabled: true,
            suggestions_enabled: false,
            highlights_enabled: false,
            filter_fields: Vec::new(),
            score_strategy: None,
            user: None,
        }
    }

    /// Create a query carrying the caller's coordinate, enabling
    /// geo-distance sorting.
    pub fn located(coordinate: Coordinate, text: impl Into<String>, page: u64, size: u64) -> Self {
        let mut query = Self::create(text, page, size);
        query.coordinate = Some(coordinate);
        query
    }

    /// Create the match-everything query.
    pub fn match_all() -> Self {
        Self::create("", QUERY_DEFAULT_PAGE, QUERY_DEFAULT_SIZE)
    }

    /// Create a query fetching exactly one item.
    pub fn by_uuid(uuid: ItemUuid) -> Self {
        Self::by_uuids(vec![uuid])
    }

    /// Create a query fetching exactly the given items.
    ///
    /// Sized to the id count, with aggregations and suggestions disabled
    /// and a single at-least-one `_id` filter over the composed ids.
    pub fn by_uuids(uuids: Vec<ItemUuid>) -> Self {
        let ids: Vec<String> = uuids.iter().map(ItemUuid::composed_uuid).collect();
        let mut query = Self::create("", QUERY_DEFAULT_PAGE, ids.len() as u64)
            .disable_aggregations()
            .disable_suggestions();

        query.filters.insert(
            "_id".to_string(),
            Filter::create("_id", ids, ApplicationType::AtLeastOne, FilterType::Field),
        );

        query
    }

    fn insert_or_remove_filter(
        filters: &mut BTreeMap<String, Filter>,
        name: &str,
        field_path: String,
        values: Vec<String>,
        application_type: ApplicationType,
        filter_type: FilterType,
    ) {
        if values.is_empty() {
            filters.remove(name);
        } else {
            filters.insert(
                name.to_string(),
                Filter::create(field_path, values, application_type, filter_type),
            );
        }
    }

    /// Filter by a named field. Empty values remove the named filter.
    ///
    /// When `aggregate` is set, a matching facet request is registered
    /// under the same name.
    pub fn filter_by(
        mut self,
        filter_name: &str,
        field: &str,
        values: Vec<String>,
        application_type: ApplicationType,
        aggregate: bool,
        aggregation_sort: AggregationSort,
    ) -> Self {
        Self::insert_or_remove_filter(
            &mut self.filters,
            filter_name,
            Filter::field_path(field),
            values,
            application_type,
            FilterType::Field,
        );

        if aggregate {
            self = self.aggregate_by(
                filter_name,
                field,
                application_type,
                aggregation_sort,
                AGGREGATION_NO_LIMIT,
            );
        }

        self
    }

    /// Restrict the searchable universe by a named field without
    /// generating facets.
    pub fn filter_universe_by(
        mut self,
        field: &str,
        values: Vec<String>,
        application_type: ApplicationType,
    ) -> Self {
        Self::insert_or_remove_filter(
            &mut self.universe_filters,
            field,
            Filter::field_path(field),
            values,
            application_type,
            FilterType::Field,
        );

        self
    }

    /// Filter by item type. Empty values remove the `type` filter.
    pub fn filter_by_types(
        mut self,
        values: Vec<String>,
        aggregate: bool,
        aggregation_sort: AggregationSort,
    ) -> Self {
        Self::insert_or_remove_filter(
            &mut self.filters,
            "type",
            Filter::field_path("type"),
            values,
            ApplicationType::AtLeastOne,
            FilterType::Field,
        );

        if aggregate {
            self.aggregations.insert(
                "type".to_string(),
                Aggregation::create(
                    "type",
                    "type",
                    ApplicationType::AtLeastOne,
                    FilterType::Field,
                    vec![],
                    aggregation_sort,
                    AGGREGATION_NO_LIMIT,
                ),
            );
        }

        self
    }

    /// Restrict the searchable universe by item type.
    pub fn filter_universe_by_types(self, values: Vec<String>) -> Self {
        self.filter_universe_by("type", values, ApplicationType::AtLeastOne)
    }

    /// Filter by item id.
    pub fn filter_by_ids(mut self, values: Vec<String>) -> Self {
        Self::insert_or_remove_filter(
            &mut self.filters,
            "id",
            Filter::field_path("id"),
            values,
            ApplicationType::AtLeastOne,
            FilterType::Field,
        );

        self
    }

    /// Restrict the searchable universe by item id.
    pub fn filter_universe_by_ids(self, values: Vec<String>) -> Self {
        self.filter_universe_by("id", values, ApplicationType::AtLeastOne)
    }

    /// Filter by a range field. Empty values remove the named filter.
    ///
    /// `options` are the range buckets requested from the companion facet.
    #[allow(clippy::too_many_arguments)]
    pub fn filter_by_range(
        mut self,
        filter_name: &str,
        field: &str,
        options: Vec<String>,
        values: Vec<String>,
        application_type: ApplicationType,
        range_type: FilterType,
        aggregate: bool,
        aggregation_sort: AggregationSort,
    ) -> Self {
        Self::insert_or_remove_filter(
            &mut self.filters,
            filter_name,
            Filter::field_path(field),
            values,
            application_type,
            range_type,
        );

        if aggregate {
            self = self.aggregate_by_range(
                filter_name,
                field,
                options,
                application_type,
                range_type,
                aggregation_sort,
                AGGREGATION_NO_LIMIT,
            );
        }

        self
    }

    /// Filter by a date-range field.
    #[allow(clippy::too_many_arguments)]
    pub fn filter_by_date_range(
        self,
        filter_name: &str,
        field: &str,
        options: Vec<String>,
        values: Vec<String>,
        application_type: ApplicationType,
        aggregate: bool,
        aggregation_sort: AggregationSort,
    ) -> Self {
        self.filter_by_range(
            filter_name,
            field,
            options,
            values,
            application_type,
            FilterType::DateRange,
            aggregate,
            aggregation_sort,
        )
    }

    /// Restrict the searchable universe by a range field.
    pub fn filter_universe_by_range(
        mut self,
        field: &str,
        values: Vec<String>,
        application_type: ApplicationType,
        range_type: FilterType,
    ) -> Self {
        Self::insert_or_remove_filter(
            &mut self.universe_filters,
            field,
            Filter::field_path(field),
            values,
            application_type,
            range_type,
        );

        self
    }

    /// Restrict the searchable universe by a date-range field.
    pub fn filter_universe_by_date_range(
        self,
        field: &str,
        values: Vec<String>,
        application_type: ApplicationType,
    ) -> Self {
        self.filter_universe_by_range(field, values, application_type, FilterType::DateRange)
    }

    /// Restrict the searchable universe to a location range.
    pub fn filter_universe_by_location(mut self, location_range: &LocationRange) -> Self {
        self.universe_filters.insert(
            "coordinate".to_string(),
            Filter::create(
                "coordinate",
                vec![location_range.to_value().to_string()],
                ApplicationType::AtLeastOne,
                FilterType::Geo,
            ),
        );

        self
    }

    /// Request a facet over a field.
    pub fn aggregate_by(
        mut self,
        name: &str,
        field: &str,
        application_type: ApplicationType,
        sort: AggregationSort,
        limit: u64,
    ) -> Self {
        self.aggregations.insert(
            name.to_string(),
            Aggregation::create(
                name,
                field,
                application_type,
                FilterType::Field,
                vec![],
                sort,
                limit,
            ),
        );

        self
    }

    /// Request a facet over range buckets. A no-op when `options` is empty.
    #[allow(clippy::too_many_arguments)]
    pub fn aggregate_by_range(
        mut self,
        name: &str,
        field: &str,
        options: Vec<String>,
        application_type: ApplicationType,
        range_type: FilterType,
        sort: AggregationSort,
        limit: u64,
    ) -> Self {
        if options.is_empty() {
            return self;
        }

        self.aggregations.insert(
            name.to_string(),
            Aggregation::create(name, field, application_type, range_type, options, sort, limit),
        );

        self
    }

    /// Request a facet over date-range buckets.
    pub fn aggregate_by_date_range(
        self,
        name: &str,
        field: &str,
        options: Vec<String>,
        application_type: ApplicationType,
        sort: AggregationSort,
        limit: u64,
    ) -> Self {
        self.aggregate_by_range(
            name,
            field,
            options,
            application_type,
            FilterType::DateRange,
            sort,
            limit,
        )
    }

    /// Assign the sort order.
    ///
    /// Sorting by geo distance requires the query to carry a coordinate;
    /// the check happens here, not at encode time.
    pub fn sort_by(mut self, sort: SortBy) -> Result<Self> {
        if sort.is_sorted_by_geo_distance() {
            let Some(coordinate) = self.coordinate else {
                return Err(ProtocolError::sorted_by_distance_without_coordinate());
            };
            self.sort = sort.with_coordinate(coordinate);
        } else {
            self.sort = sort;
        }

        Ok(self)
    }

    /// Move to a page, clamped to 1. The result offset is re-derived.
    pub fn with_page(mut self, page: u64) -> Self {
        self.page = page.max(QUERY_DEFAULT_PAGE);
        self.from = (self.page - 1) * self.size;
        self
    }

    /// Change the page size. The result offset is re-derived.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self.from = (self.page - 1) * self.size;
        self
    }

    /// Enable result items in the response.
    pub fn enable_results(mut self) -> Self {
        self.results_enabled = true;
        self
    }

    /// Disable result items in the response.
    pub fn disable_results(mut self) -> Self {
        self.results_enabled = false;
        self
    }

    /// Enable facet computation.
    pub fn enable_aggregations(mut self) -> Self {
        self.aggregations_enabled = true;
        self
    }

    /// Disable facet computation.
    pub fn disable_aggregations(mut self) -> Self {
        self.aggregations_enabled = false;
        self
    }

    /// Enable suggestions in the response.
    pub fn enable_suggestions(mut self) -> Self {
        self.suggestions_enabled = true;
        self
    }

    /// Disable suggestions in the response.
    pub fn disable_suggestions(mut self) -> Self {
        self.suggestions_enabled = false;
        self
    }

    /// Enable highlighted fragments in result items.
    pub fn enable_highlights(mut self) -> Self {
        self.highlights_enabled = true;
        self
    }

    /// Disable highlighted fragments in result items.
    pub fn disable_highlights(mut self) -> Self {
        self.highlights_enabled = false;
        self
    }

    /// Append one promoted item.
    pub fn promote_uuid(mut self, uuid: ItemUuid) -> Self {
        self.items_promoted.push(uuid);
        self
    }

    /// Replace the promoted item list.
    pub fn promote_uuids(mut self, uuids: Vec<ItemUuid>) -> Self {
        self.items_promoted = uuids;
        self
    }

    /// Exclude one item from the results.
    pub fn exclude_uuid(self, uuid: ItemUuid) -> Self {
        self.exclude_uuids(vec![uuid])
    }

    /// Exclude items from the results via an exclusion `_id` filter.
    pub fn exclude_uuids(mut self, uuids: Vec<ItemUuid>) -> Self {
        self.filters.insert(
            EXCLUDED_IDS_FILTER.to_string(),
            Filter::create(
                "_id",
                uuids.iter().map(ItemUuid::composed_uuid).collect(),
                ApplicationType::Exclude,
                FilterType::Field,
            ),
        );

        self
    }

    /// Restrict which filters the service evaluates.
    pub fn with_filter_fields(mut self, filter_fields: Vec<String>) -> Self {
        self.filter_fields = filter_fields;
        self
    }

    /// Assign the score strategy.
    pub fn with_score_strategy(mut self, score_strategy: ScoreStrategy) -> Self {
        self.score_strategy = Some(score_strategy);
        self
    }

    /// Issue the query on behalf of a user.
    pub fn by_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    /// Drop the user context.
    pub fn anonymously(mut self) -> Self {
        self.user = None;
        self
    }

    /// The query text, held by the internal query filter.
    pub fn query_text(&self) -> &str {
        self.filters
            .get(QUERY_FILTER)
            .and_then(|f| f.values().first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// The query coordinate, when created located.
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    /// All filters, including the internal query filter.
    pub fn filters(&self) -> &BTreeMap<String, Filter> {
        &self.filters
    }

    /// A filter by name.
    pub fn filter(&self, name: &str) -> Option<&Filter> {
        self.filters.get(name)
    }

    /// The first filter over the given caller-facing field name.
    pub fn filter_by_field(&self, field: &str) -> Option<&Filter> {
        let path = Filter::field_path(field);
        self.filters.values().find(|f| f.field() == path)
    }

    /// All universe filters.
    pub fn universe_filters(&self) -> &BTreeMap<String, Filter> {
        &self.universe_filters
    }

    /// A universe filter by name.
    pub fn universe_filter(&self, name: &str) -> Option<&Filter> {
        self.universe_filters.get(name)
    }

    /// All facet requests.
    pub fn aggregations(&self) -> &BTreeMap<String, Aggregation> {
        &self.aggregations
    }

    /// A facet request by name.
    pub fn aggregation(&self, name: &str) -> Option<&Aggregation> {
        self.aggregations.get(name)
    }

    /// The sort order.
    pub fn sort(&self) -> &SortBy {
        &self.sort
    }

    /// The page number, 1-based.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// The derived result offset.
    pub fn from(&self) -> u64 {
        self.from
    }

    /// The page size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether result items are requested.
    pub fn are_results_enabled(&self) -> bool {
        self.results_enabled
    }

    /// Whether facets are requested.
    pub fn are_aggregations_enabled(&self) -> bool {
        self.aggregations_enabled
    }

    /// Whether suggestions are requested.
    pub fn are_suggestions_enabled(&self) -> bool {
        self.suggestions_enabled
    }

    /// Whether highlights are requested.
    pub fn are_highlights_enabled(&self) -> bool {
        self.highlights_enabled
    }

    /// The promoted items, in promotion order.
    pub fn items_promoted(&self) -> &[ItemUuid] {
        &self.items_promoted
    }

    /// The restricted filter fields.
    pub fn filter_fields(&self) -> &[String] {
        &self.filter_fields
    }

    /// The score strategy.
    pub fn score_strategy(&self) -> Option<&ScoreStrategy> {
        self.score_strategy.as_ref()
    }

    /// The user context.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Decode from a wire value, failing fast on a malformed shape.
    ///
    /// Decoding re-applies the construction defaults for every omitted
    /// key and trusts the payload on the geo-distance coordinate
    /// invariant.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| ProtocolError::invalid_format(format!("malformed query: {e}")))
    }

    /// Encode to a wire value, omitting every key at its default.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn default_page() -> u64 {
    QUERY_DEFAULT_PAGE
}

fn is_default_page(page: &u64) -> bool {
    *page == QUERY_DEFAULT_PAGE
}

fn default_size() -> u64 {
    QUERY_DEFAULT_SIZE
}

fn is_default_size(size: &u64) -> bool {
    *size == QUERY_DEFAULT_SIZE
}

/// Wire form of [`Query`]; the single place the key set and omission
/// rules are spelled out.
#[derive(Serialize, Deserialize)]
struct QueryWire {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    q: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coordinate: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    universe_filters: BTreeMap<String, Filter>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    filters: BTreeMap<String, Filter>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    aggregations: BTreeMap<String, Aggregation>,
    #[serde(default, skip_serializing_if = "SortBy::is_default")]
    sort: SortBy,
    #[serde(default = "default_page", skip_serializing_if = "is_default_page")]
    page: u64,
    #[serde(default = "default_size", skip_serializing_if = "is_default_size")]
    size: u64,
    #[serde(default = "wire::bool_true", skip_serializing_if = "wire::is_true")]
    results_enabled: bool,
    #[serde(default, skip_serializing_if = "wire::is_false")]
    suggestions_enabled: bool,
    #[serde(default, skip_serializing_if = "wire::is_false")]
    highlights_enabled: bool,
    #[serde(default = "wire::bool_true", skip_serializing_if = "wire::is_true")]
    aggregations_enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    filter_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score_strategy: Option<ScoreStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    items_promoted: Vec<ItemUuid>,
}

impl From<&Query> for QueryWire {
    fn from(query: &Query) -> Self {
        let filters = query
            .filters
            .iter()
            .filter(|(_, f)| f.filter_type() != FilterType::Query)
            .map(|(name, f)| (name.clone(), f.clone()))
            .collect();

        QueryWire {
            q: query.query_text().to_string(),
            coordinate: query.coordinate,
            universe_filters: query.universe_filters.clone(),
            filters,
            aggregations: query.aggregations.clone(),
            sort: query.sort.clone(),
            page: query.page,
            size: query.size,
            results_enabled: query.results_enabled,
            suggestions_enabled: query.suggestions_enabled,
            highlights_enabled: query.highlights_enabled,
            aggregations_enabled: query.aggregations_enabled,
            filter_fields: query.filter_fields.clone(),
            score_strategy: query
                .score_strategy
                .clone()
                .filter(|s| !s.is_default()),
            user: query.user.clone(),
            items_promoted: query.items_promoted.clone(),
        }
    }
}

impl From<QueryWire> for Query {
    fn from(wire: QueryWire) -> Self {
        let mut query = match wire.coordinate {
            Some(coordinate) => Query::located(coordinate, wire.q, wire.page, wire.size),
            None => Query::create(wire.q, wire.page, wire.size),
        };

        for (name, filter) in wire.filters {
            query.filters.insert(name, filter);
        }
        query.universe_filters = wire.universe_filters;
        query.aggregations = wire.aggregations;
        query.sort = wire.sort;
        query.results_enabled = wire.results_enabled;
        query.suggestions_enabled = wire.suggestions_enabled;
        query.highlights_enabled = wire.highlights_enabled;
        query.aggregations_enabled = wire.aggregations_enabled;
        query.filter_fields = wire.filter_fields;
        query.score_strategy = wire.score_strategy;
        query.user = wire.user;
        query.items_promoted = wire.items_promoted;

        query
    }
}

impl Serialize for Query {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        QueryWire::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Query {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        QueryWire::deserialize(deserializer).map(Into::into)
    }
}
