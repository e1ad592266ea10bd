//! Cursor-paginated result window and aggregation buckets

use serde::Serialize;
use serde_json::{Map, Value};

use crate::query::QueryError;

use super::errors::PaginationResult;

/// One item of a page with the cursor that resumes after it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub node: Value,
    pub cursor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub edges: Vec<Edge>,
    pub page_info: PageInfo,
    /// Aggregation results over the full filtered set
    pub group_by: Vec<Aggregation>,
}

impl Connection {
    pub fn nodes(&self) -> impl Iterator<Item = &Value> {
        self.edges.iter().map(|edge| &edge.node)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Buckets of one group-by field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    /// Dot-joined field path the buckets group by
    pub group_by: String,
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub key: String,
    pub count: u64,
    /// Nested aggregations within this bucket
    pub aggregations: Vec<Aggregation>,
}

impl Aggregation {
    /// Bucket count for a key, if the key has a bucket
    pub fn count_of(&self, key: &str) -> Option<u64> {
        self.buckets
            .iter()
            .find(|bucket| bucket.key == key)
            .map(|bucket| bucket.count)
    }
}

/// Bucket fields that are not sub-aggregations
const BUCKET_FIELDS: &[&str] = &["key", "key_as_string", "doc_count"];

/// Decode raw aggregation results keyed by aggregation name.
///
/// Bucket responses nest: any object-valued bucket entry other than the key
/// and count fields is decoded as a sub-aggregation.
pub fn decode_aggregations(results: &Map<String, Value>) -> PaginationResult<Vec<Aggregation>> {
    results
        .iter()
        .map(|(name, result)| decode_aggregation(name, result))
        .collect()
}

fn decode_aggregation(name: &str, result: &Value) -> PaginationResult<Aggregation> {
    let buckets = result
        .get("buckets")
        .and_then(Value::as_array)
        .ok_or_else(|| QueryError::UnsupportedAggregation(name.to_string()))?;

    let buckets = buckets
        .iter()
        .map(|bucket| decode_bucket(name, bucket))
        .collect::<PaginationResult<Vec<_>>>()?;

    Ok(Aggregation {
        group_by: name.to_string(),
        buckets,
    })
}

fn decode_bucket(name: &str, bucket: &Value) -> PaginationResult<Bucket> {
    let object = bucket
        .as_object()
        .ok_or_else(|| QueryError::UnsupportedAggregation(name.to_string()))?;

    let key = match object.get("key_as_string").or_else(|| object.get("key")) {
        Some(Value::String(key)) => key.clone(),
        Some(Value::Null) | None => {
            return Err(QueryError::UnsupportedAggregation(name.to_string()).into());
        }
        Some(key) => key.to_string(),
    };

    let sub_results: Map<String, Value> = object
        .iter()
        .filter(|(field, value)| {
            !BUCKET_FIELDS.contains(&field.as_str()) && value.get("buckets").is_some()
        })
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect();

    Ok(Bucket {
        key,
        count: object.get("doc_count").and_then(Value::as_u64).unwrap_or(0),
        aggregations: decode_aggregations(&sub_results)?,
    })
}
