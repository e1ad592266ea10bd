//! Search engine client boundary
//!
//! Typed requests and responses exchanged with the search engine, and the
//! [`SearchClient`] trait every engine implementation provides.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use super::errors::{EngineError, EngineResult};
use crate::query::{Query, SortClause, TermsAggregation};

// =============================================================================
// Search
// =============================================================================

/// One search round trip
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub index: String,
    pub query: Query,
    pub sort: Vec<SortClause>,
    /// Sort values of the hit to resume after
    pub search_after: Option<Vec<Value>>,
    /// Maximum number of hits
    pub size: usize,
    pub aggregations: Vec<TermsAggregation>,
}

impl SearchRequest {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            query: Query::MatchAll,
            sort: Vec::new(),
            search_after: None,
            size: 0,
            aggregations: Vec::new(),
        }
    }

    /// Request body in the engine's wire shape
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".into(), self.query.to_json());
        body.insert("size".into(), json!(self.size));
        body.insert("track_total_hits".into(), json!(false));

        if !self.sort.is_empty() {
            body.insert(
                "sort".into(),
                self.sort.iter().map(SortClause::to_json).collect(),
            );
        }
        if let Some(search_after) = &self.search_after {
            body.insert("search_after".into(), json!(search_after));
        }
        if !self.aggregations.is_empty() {
            let aggregations: Map<String, Value> = self
                .aggregations
                .iter()
                .map(|a| (a.name.clone(), a.to_json()))
                .collect();
            body.insert("aggs".into(), Value::Object(aggregations));
        }
        Value::Object(body)
    }
}

/// One matching document
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub index: String,
    pub id: String,
    pub score: Option<f64>,
    pub source: Value,
    /// Values of the request's sort clauses for this hit
    pub sort: Vec<Value>,
}

/// Hits in sort order plus raw aggregation results keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub aggregations: Map<String, Value>,
}

impl SearchResponse {
    /// Read a response body in the engine's wire shape
    pub fn from_json(body: &Value) -> EngineResult<Self> {
        let hits = match body.pointer("/hits/hits") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(hits)) => hits.iter().map(hit_from_json).collect::<EngineResult<_>>()?,
            Some(_) => return Err(EngineError::Internal("hits.hits is not a list".into())),
        };

        let aggregations = body
            .get("aggregations")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Ok(Self { hits, aggregations })
    }
}

fn hit_from_json(hit: &Value) -> EngineResult<SearchHit> {
    let id = hit
        .get("_id")
        .and_then(Value::as_str)
        .ok_or_else(|| EngineError::Internal("hit without _id".into()))?;

    Ok(SearchHit {
        index: hit.get("_index").and_then(Value::as_str).unwrap_or_default().to_string(),
        id: id.to_string(),
        score: hit.get("_score").and_then(Value::as_f64),
        source: hit.get("_source").cloned().unwrap_or(Value::Null),
        sort: hit
            .get("sort")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    })
}

// =============================================================================
// Documents
// =============================================================================

/// Result of fetching one document by id
#[derive(Debug, Clone, PartialEq)]
pub struct GetResult {
    pub index: String,
    pub id: String,
    /// Document source when found
    pub source: Option<Value>,
    /// Failure reason for this item
    pub error: Option<String>,
}

impl GetResult {
    pub fn found(&self) -> bool {
        self.source.is_some()
    }
}

/// One write of a bulk request
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOperation {
    Index {
        index: String,
        id: String,
        document: Value,
    },
    Delete {
        index: String,
        id: String,
    },
}

impl BulkOperation {
    pub fn index(&self) -> &str {
        match self {
            BulkOperation::Index { index, .. } | BulkOperation::Delete { index, .. } => index,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            BulkOperation::Index { id, .. } | BulkOperation::Delete { id, .. } => id,
        }
    }
}

/// Batch of document writes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkRequest {
    pub operations: Vec<BulkOperation>,
}

impl BulkRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, index: impl Into<String>, id: impl Into<String>, document: Value) -> Self {
        self.operations.push(BulkOperation::Index {
            index: index.into(),
            id: id.into(),
            document,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Newline-delimited action and source lines
    pub fn to_ndjson(&self) -> String {
        let mut lines = String::new();
        for operation in &self.operations {
            match operation {
                BulkOperation::Index { index, id, document } => {
                    lines.push_str(&json!({"index": {"_index": index, "_id": id}}).to_string());
                    lines.push('\n');
                    lines.push_str(&document.to_string());
                }
                BulkOperation::Delete { index, id } => {
                    lines.push_str(&json!({"delete": {"_index": index, "_id": id}}).to_string());
                }
            }
            lines.push('\n');
        }
        lines
    }
}

/// Outcome of one bulk operation
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItem {
    pub index: String,
    pub id: String,
    pub status: u16,
    /// Failure reason, when the item failed
    pub error: Option<String>,
}

impl BulkItem {
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Per-item outcomes of a bulk request, in request order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkResponse {
    pub items: Vec<BulkItem>,
}

impl BulkResponse {
    pub fn has_failures(&self) -> bool {
        self.items.iter().any(BulkItem::is_failure)
    }

    pub fn failures(&self) -> impl Iterator<Item = &BulkItem> {
        self.items.iter().filter(|item| item.is_failure())
    }
}

// =============================================================================
// Indices and aliases
// =============================================================================

/// Create an index with settings and mappings
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexRequest {
    pub index: String,
    /// `{"settings": .., "mappings": ..}`
    pub body: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateIndexResponse {
    pub acknowledged: bool,
}

/// One step of an atomic alias update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasAction {
    Add { index: String, alias: String },
    Remove { index: String, alias: String },
}

impl AliasAction {
    pub fn to_json(&self) -> Value {
        match self {
            AliasAction::Add { index, alias } => json!({"add": {"index": index, "alias": alias}}),
            AliasAction::Remove { index, alias } => {
                json!({"remove": {"index": index, "alias": alias}})
            }
        }
    }
}

/// Search engine operations used by the document service.
///
/// Implementations execute exactly one round trip per call; retries and
/// timeouts are their own concern.
pub trait SearchClient {
    fn search(&self, request: &SearchRequest) -> EngineResult<SearchResponse>;

    /// Fetch documents by id, one result per requested id in request order
    fn multi_get(&self, index: &str, ids: &[String]) -> EngineResult<Vec<GetResult>>;

    fn bulk(&self, request: &BulkRequest) -> EngineResult<BulkResponse>;

    /// Delete one document. Returns false if it did not exist.
    fn delete(&self, index: &str, id: &str) -> EngineResult<bool>;

    fn create_index(&self, request: &CreateIndexRequest) -> EngineResult<CreateIndexResponse>;

    /// Indices currently carrying an alias, each with all of its aliases
    fn get_aliases(&self, alias: &str) -> EngineResult<BTreeMap<String, Vec<String>>>;

    /// Apply alias actions atomically. Returns the acknowledgement.
    fn update_aliases(&self, actions: &[AliasAction]) -> EngineResult<bool>;
}
