//! Wire model for the Strata search service.
//!
//! This crate defines the two-sided encoding engine of the search client:
//!
//! - The **request model**: [`Query`] with its [`Filter`]s, universe
//!   filters, facet requests ([`Aggregation`]), [`SortBy`], pagination,
//!   promoted and excluded items, [`ScoreStrategy`] and [`User`] context,
//!   and its canonical wire representation.
//! - The **result model**: [`SearchResult`] with its [`Item`]s and the
//!   hierarchical facet resolution ([`ResultAggregation`], [`Counter`])
//!   that decides which facet values are active versus selectable.
//!
//! Wire payloads are canonical: every key equal to its documented default
//! is omitted on encode and restored on decode, so re-encoding a decoded
//! value reproduces the same bytes.
//!
//! # Example
//!
//! ```
//! use strata_search_protocol::{AggregationSort, ApplicationType, Query};
//!
//! let query = Query::create("wireless headphones", 1, 20)
//!     .filter_by_types(vec!["product".to_string()], true, AggregationSort::CountDesc)
//!     .filter_by(
//!         "brand",
//!         "brand",
//!         vec!["acme".to_string()],
//!         ApplicationType::AtLeastOne,
//!         true,
//!         AggregationSort::CountDesc,
//!     );
//!
//! let wire = query.to_value();
//! let parsed = Query::from_value(&wire).unwrap();
//! assert_eq!(parsed.to_value(), wire);
//! ```

mod aggregation;
mod application;
mod changes;
mod coordinate;
mod counter;
mod error;
mod facet;
mod filter;
mod item;
mod location;
pub mod metadata;
mod query;
pub mod range;
mod result;
mod score;
mod settings;
mod sort;
mod user;
mod wire;

pub use aggregation::{Aggregation, AggregationSort, AGGREGATION_NO_LIMIT};
pub use application::{ApplicationType, FilterType};
pub use changes::{
    Change, Changes, CHANGE_TYPE_ARRAY_ELEMENT_ADD, CHANGE_TYPE_ARRAY_ELEMENT_DELETE,
    CHANGE_TYPE_ARRAY_ELEMENT_UPDATE, CHANGE_TYPE_LITERAL, CHANGE_TYPE_VALUE,
};
pub use coordinate::Coordinate;
pub use counter::{Counter, CounterValues};
pub use error::{ProtocolError, Result};
pub use facet::{ActiveElement, Aggregations, ResultAggregation};
pub use filter::{Filter, DEFAULT_FILTER_FIELD};
pub use item::{Item, ItemUuid, COMPOSED_UUID_SEPARATOR};
pub use location::LocationRange;
pub use query::{Query, QUERY_DEFAULT_PAGE, QUERY_DEFAULT_SIZE, QUERY_INFINITE_SIZE};
pub use result::SearchResult;
pub use score::ScoreStrategy;
pub use settings::{IndexSettings, Synonym};
pub use sort::{Mode, Order, SortBy, SortCriterion};
pub use user::User;
