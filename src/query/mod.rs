//! Query translation subsystem
//!
//! Compiles client filter, group-by and sort input into the search engine's
//! native query, aggregation and sort clauses. Translators are pure: every
//! call gets fresh working state and the proto schema is never touched.

mod aggregation;
mod dsl;
mod errors;
mod filter;
mod sort;
mod transformer;

pub use aggregation::{to_aggregations, GroupBy, DEFAULT_BUCKET_COUNT};
pub use dsl::{
    BoolQuery, DistanceUnit, GeoPoint, Query, RangeQuery, SortClause, SortOrder, TermsAggregation,
    SCORE_FIELD,
};
pub use errors::{QueryError, QueryResult};
pub use filter::{Condition, Filter, FilterExpr, FilterOperator, GeoDistanceRange};
pub use sort::{to_sort, SortGeoDistance, SortScript, SortSpec};
pub use transformer::{to_query, QueryTransformer};
