//! Keyset pagination
//!
//! Plans one search request per page (query, sort with identifier tie-break,
//! `search_after` from the cursor, one lookahead hit, aggregations) and
//! decodes the response into a [`Connection`] with per-hit cursors and
//! aggregation buckets.

mod connection;
mod cursor;
mod engine;
mod errors;

pub use connection::{decode_aggregations, Aggregation, Bucket, Connection, Edge, PageInfo};
pub use cursor::{Cursor, CURSOR_VERSION};
pub use engine::{PageRequest, PaginationEngine, SearchPlan};
pub use errors::{PaginationError, PaginationResult};
