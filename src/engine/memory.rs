//! In-memory search engine
//!
//! Evaluates the native query algebra over JSON documents held in process.
//! Supports every query clause the filter translator emits, field/score/geo
//! distance sorting with `search_after`, terms aggregations and aliases.
//! Documents are checked against the index mapping on write, so a value that
//! does not fit its mapped type fails that bulk item only.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::client::{
    AliasAction, BulkItem, BulkOperation, BulkRequest, BulkResponse, CreateIndexRequest,
    CreateIndexResponse, GetResult, SearchClient, SearchHit, SearchRequest, SearchResponse,
};
use super::errors::{EngineError, EngineResult};
use crate::path::FieldPath;
use crate::query::{BoolQuery, GeoPoint, Query, RangeQuery, SortClause, SortOrder, TermsAggregation};

/// Score given to every hit; the engine does not rank by relevance
const CONSTANT_SCORE: f64 = 1.0;

#[derive(Debug, Clone, Default)]
struct StoredIndex {
    mappings: Value,
    aliases: BTreeSet<String>,
    documents: BTreeMap<String, Value>,
}

/// In-memory implementation of [`SearchClient`]
#[derive(Debug, Default)]
pub struct InMemorySearchEngine {
    indices: RwLock<BTreeMap<String, StoredIndex>>,
}

impl InMemorySearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of all indices
    pub fn index_names(&self) -> EngineResult<Vec<String>> {
        Ok(self.read()?.keys().cloned().collect())
    }

    /// Mappings an index was created with
    pub fn mappings(&self, index: &str) -> EngineResult<Value> {
        self.read()?
            .get(index)
            .map(|stored| stored.mappings.clone())
            .ok_or_else(|| EngineError::IndexNotFound(index.to_string()))
    }

    /// Number of documents in an index or behind an alias
    pub fn document_count(&self, index: &str) -> EngineResult<usize> {
        let indices = self.read()?;
        let count = resolve(&indices, index)?
            .iter()
            .filter_map(|name| indices.get(*name))
            .map(|stored| stored.documents.len())
            .sum();
        Ok(count)
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, BTreeMap<String, StoredIndex>>> {
        self.indices
            .read()
            .map_err(|_| EngineError::Internal("Lock poisoned".to_string()))
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, BTreeMap<String, StoredIndex>>> {
        self.indices
            .write()
            .map_err(|_| EngineError::Internal("Lock poisoned".to_string()))
    }
}

impl SearchClient for InMemorySearchEngine {
    fn search(&self, request: &SearchRequest) -> EngineResult<SearchResponse> {
        let indices = self.read()?;

        let mut matched = Vec::new();
        for name in resolve(&indices, &request.index)? {
            let Some(stored) = indices.get(name) else {
                continue;
            };
            for (id, source) in &stored.documents {
                if matches(&request.query, source) {
                    matched.push((name, id, source));
                }
            }
        }

        let sources: Vec<&Value> = matched.iter().map(|(_, _, source)| *source).collect();
        let aggregations: Map<String, Value> = request
            .aggregations
            .iter()
            .map(|aggregation| (aggregation.name.clone(), terms_buckets(aggregation, &sources)))
            .collect();

        let mut hits = matched
            .into_iter()
            .map(|(index, id, source)| {
                let sort = request
                    .sort
                    .iter()
                    .map(|clause| sort_value(clause, id, source))
                    .collect::<EngineResult<Vec<_>>>()?;
                Ok(SearchHit {
                    index: index.to_string(),
                    id: id.clone(),
                    score: Some(CONSTANT_SCORE),
                    source: source.clone(),
                    sort,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        hits.sort_by(|a, b| compare_keys(&request.sort, &a.sort, &b.sort));

        if let Some(after) = &request.search_after {
            if after.len() != request.sort.len() {
                return Err(EngineError::response(
                    400,
                    format!(
                        "search_after has {} value(s) but sort has {}",
                        after.len(),
                        request.sort.len()
                    ),
                    None,
                ));
            }
            hits.retain(|hit| compare_keys(&request.sort, &hit.sort, after) == Ordering::Greater);
        }
        hits.truncate(request.size);

        debug!(
            index = %request.index,
            hits = hits.len(),
            aggregations = aggregations.len(),
            "In-memory search executed"
        );

        Ok(SearchResponse { hits, aggregations })
    }

    fn multi_get(&self, index: &str, ids: &[String]) -> EngineResult<Vec<GetResult>> {
        let indices = self.read()?;
        let targets = resolve(&indices, index);

        let results = ids
            .iter()
            .map(|id| match &targets {
                Err(e) => GetResult {
                    index: index.to_string(),
                    id: id.clone(),
                    source: None,
                    error: Some(e.to_string()),
                },
                Ok(names) => {
                    let found = names.iter().find_map(|name| {
                        let document = indices.get(*name)?.documents.get(id)?;
                        Some((name.to_string(), document.clone()))
                    });
                    match found {
                        Some((name, document)) => GetResult {
                            index: name,
                            id: id.clone(),
                            source: Some(document),
                            error: None,
                        },
                        None => GetResult {
                            index: index.to_string(),
                            id: id.clone(),
                            source: None,
                            error: None,
                        },
                    }
                }
            })
            .collect();
        Ok(results)
    }

    fn bulk(&self, request: &BulkRequest) -> EngineResult<BulkResponse> {
        let mut indices = self.write()?;
        let items = request
            .operations
            .iter()
            .map(|operation| apply_operation(&mut indices, operation))
            .collect();
        Ok(BulkResponse { items })
    }

    fn delete(&self, index: &str, id: &str) -> EngineResult<bool> {
        let mut indices = self.write()?;
        let targets: Vec<String> = resolve(&indices, index)?
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut deleted = false;
        for name in targets {
            if let Some(stored) = indices.get_mut(&name) {
                deleted |= stored.documents.remove(id).is_some();
            }
        }
        Ok(deleted)
    }

    fn create_index(&self, request: &CreateIndexRequest) -> EngineResult<CreateIndexResponse> {
        let mut indices = self.write()?;
        if indices.contains_key(&request.index) || is_alias(&indices, &request.index) {
            return Err(EngineError::IndexAlreadyExists(request.index.clone()));
        }

        let mappings = request
            .body
            .get("mappings")
            .cloned()
            .unwrap_or_else(|| json!({}));
        indices.insert(
            request.index.clone(),
            StoredIndex {
                mappings,
                ..Default::default()
            },
        );
        Ok(CreateIndexResponse { acknowledged: true })
    }

    fn get_aliases(&self, alias: &str) -> EngineResult<BTreeMap<String, Vec<String>>> {
        let indices = self.read()?;
        Ok(indices
            .iter()
            .filter(|(_, stored)| stored.aliases.contains(alias))
            .map(|(name, stored)| (name.clone(), stored.aliases.iter().cloned().collect()))
            .collect())
    }

    fn update_aliases(&self, actions: &[AliasAction]) -> EngineResult<bool> {
        let mut indices = self.write()?;

        for action in actions {
            match action {
                AliasAction::Add { index, .. } => {
                    if !indices.contains_key(index) {
                        return Err(EngineError::IndexNotFound(index.clone()));
                    }
                }
                AliasAction::Remove { index, alias } => {
                    let stored = indices
                        .get(index)
                        .ok_or_else(|| EngineError::IndexNotFound(index.clone()))?;
                    if !stored.aliases.contains(alias) {
                        return Err(EngineError::response(404, format!("aliases [{}] missing", alias), None));
                    }
                }
            }
        }

        for action in actions {
            match action {
                AliasAction::Add { index, alias } => {
                    if let Some(stored) = indices.get_mut(index) {
                        stored.aliases.insert(alias.clone());
                    }
                }
                AliasAction::Remove { index, alias } => {
                    if let Some(stored) = indices.get_mut(index) {
                        stored.aliases.remove(alias);
                    }
                }
            }
        }
        Ok(true)
    }
}

// =============================================================================
// Index resolution
// =============================================================================

fn is_alias(indices: &BTreeMap<String, StoredIndex>, name: &str) -> bool {
    indices.values().any(|stored| stored.aliases.contains(name))
}

/// Index names behind an index or alias name
fn resolve<'a>(indices: &'a BTreeMap<String, StoredIndex>, name: &str) -> EngineResult<Vec<&'a str>> {
    if let Some((index, _)) = indices.get_key_value(name) {
        return Ok(vec![index.as_str()]);
    }

    let names: Vec<&str> = indices
        .iter()
        .filter(|(_, stored)| stored.aliases.contains(name))
        .map(|(index, _)| index.as_str())
        .collect();
    if names.is_empty() {
        return Err(EngineError::IndexNotFound(name.to_string()));
    }
    Ok(names)
}

/// Index a write goes to. Unknown names create the index on first write.
fn write_target(indices: &BTreeMap<String, StoredIndex>, name: &str) -> EngineResult<String> {
    match resolve(indices, name) {
        Ok(names) if names.len() == 1 => Ok(names[0].to_string()),
        Ok(_) => Err(EngineError::response(
            400,
            format!("alias [{}] has more than one index associated with it", name),
            None,
        )),
        Err(_) => Ok(name.to_string()),
    }
}

// =============================================================================
// Bulk writes
// =============================================================================

fn apply_operation(indices: &mut BTreeMap<String, StoredIndex>, operation: &BulkOperation) -> BulkItem {
    let failed = |status: u16, reason: String| BulkItem {
        index: operation.index().to_string(),
        id: operation.id().to_string(),
        status,
        error: Some(reason),
    };

    let target = match write_target(indices, operation.index()) {
        Ok(target) => target,
        Err(e) => return failed(e.status(), e.reason()),
    };

    match operation {
        BulkOperation::Index { id, document, .. } => {
            let stored = indices.entry(target.clone()).or_default();
            if let Err(reason) = check_document(&stored.mappings, document) {
                return failed(400, reason);
            }

            let created = stored.documents.insert(id.clone(), document.clone()).is_none();
            BulkItem {
                index: target,
                id: id.clone(),
                status: if created { 201 } else { 200 },
                error: None,
            }
        }
        BulkOperation::Delete { id, .. } => {
            let deleted = indices
                .get_mut(&target)
                .map_or(false, |stored| stored.documents.remove(id).is_some());
            BulkItem {
                index: target,
                id: id.clone(),
                status: if deleted { 200 } else { 404 },
                error: None,
            }
        }
    }
}

/// Check a document against a mapping. Unmapped fields are ignored.
fn check_document(mappings: &Value, document: &Value) -> Result<(), String> {
    if !document.is_object() {
        return Err("mapper_parsing_exception: document must be an object".to_string());
    }
    match mappings.get("properties").and_then(Value::as_object) {
        Some(properties) => check_properties(properties, document, &mut FieldPath::root()),
        None => Ok(()),
    }
}

fn check_properties(properties: &Map<String, Value>, node: &Value, path: &mut FieldPath) -> Result<(), String> {
    for (name, mapping) in properties {
        let Some(value) = node.get(name) else {
            continue;
        };
        path.push(name.as_str());
        let result = check_value(mapping, value, path);
        path.pop();
        result?;
    }
    Ok(())
}

fn check_value(mapping: &Value, value: &Value, path: &mut FieldPath) -> Result<(), String> {
    if let Value::Array(items) = value {
        return items.iter().try_for_each(|item| check_value(mapping, item, path));
    }
    if value.is_null() {
        return Ok(());
    }

    let mapped = mapping.get("type").and_then(Value::as_str);
    match mapped {
        None | Some("object") | Some("nested") => match (value, mapping.get("properties")) {
            (Value::Object(_), Some(Value::Object(properties))) => check_properties(properties, value, path),
            (Value::Object(_), _) => Ok(()),
            _ => Err(parse_failure(path, mapped.unwrap_or("object"))),
        },
        Some(mapped) if fits(mapped, value) => Ok(()),
        Some(mapped) => Err(parse_failure(path, mapped)),
    }
}

fn parse_failure(path: &FieldPath, mapped: &str) -> String {
    format!(
        "mapper_parsing_exception: failed to parse field [{}] of type [{}]",
        path, mapped
    )
}

/// True if a non-null scalar value can be indexed as a mapping type
fn fits(mapped: &str, value: &Value) -> bool {
    match mapped {
        "keyword" | "text" => !value.is_object(),
        "boolean" => value.is_boolean() || matches!(value.as_str(), Some("true" | "false")),
        "byte" => integer_in(value, i8::MIN.into(), i8::MAX.into()),
        "short" => integer_in(value, i16::MIN.into(), i16::MAX.into()),
        "integer" => integer_in(value, i32::MIN.into(), i32::MAX.into()),
        "long" => integer_in(value, i64::MIN, i64::MAX),
        "float" | "double" | "half_float" | "scaled_float" => number(value).is_some(),
        "date" => is_date(value),
        "geo_point" => geo_point(value).is_some(),
        _ => true,
    }
}

fn integer_in(value: &Value, min: i64, max: i64) -> bool {
    let integer = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    integer.map_or(false, |i| (min..=max).contains(&i))
}

fn is_date(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => {
            DateTime::parse_from_rfc3339(s).is_ok()
                || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
                || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        }
        _ => false,
    }
}

// =============================================================================
// Query evaluation
// =============================================================================

/// Non-null values at a dot-joined field path, arrays fanned out
fn field_values<'a>(source: &'a Value, field: &str) -> Vec<&'a Value> {
    FieldPath::parse(field)
        .collect(source)
        .into_iter()
        .filter(|value| !value.is_null())
        .collect()
}

fn matches(query: &Query, source: &Value) -> bool {
    match query {
        Query::MatchAll => true,
        Query::Term { field, value } => field_values(source, field)
            .into_iter()
            .any(|v| values_equal(v, value)),
        Query::Terms { field, values } => field_values(source, field)
            .into_iter()
            .any(|v| values.iter().any(|expected| values_equal(v, expected))),
        Query::Match { field, query } => field_values(source, field)
            .into_iter()
            .any(|v| text_matches(v, query)),
        Query::Exists { field } => !field_values(source, field).is_empty(),
        Query::Range(range) => field_values(source, &range.field)
            .into_iter()
            .any(|v| in_range(v, range)),
        Query::GeoDistance {
            field,
            center,
            distance,
            unit,
        } => {
            let max_meters = distance * unit.meters();
            field_values(source, field)
                .into_iter()
                .filter_map(geo_point)
                .any(|point| center.distance_meters(&point) <= max_meters)
        }
        Query::Bool(query) => bool_matches(query, source),
    }
}

fn bool_matches(query: &BoolQuery, source: &Value) -> bool {
    if !query.must.iter().all(|q| matches(q, source)) {
        return false;
    }
    if query.must_not.iter().any(|q| matches(q, source)) {
        return false;
    }

    let required = query
        .minimum_should_match
        .map(|n| n as usize)
        .unwrap_or(if query.must.is_empty() && !query.should.is_empty() { 1 } else { 0 });
    query.should.iter().filter(|q| matches(q, source)).count() >= required
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            matches!((number(actual), number(expected)), (Some(a), Some(b)) if a == b)
        }
        (Value::Bool(b), Value::String(s)) | (Value::String(s), Value::Bool(b)) => {
            s.as_str() == if *b { "true" } else { "false" }
        }
        _ => actual == expected,
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn text_matches(actual: &Value, query: &Value) -> bool {
    match (actual, query) {
        (Value::String(text), Value::String(query)) => {
            let words: BTreeSet<String> = tokens(text).collect();
            tokens(query).any(|token| words.contains(&token))
        }
        _ => values_equal(actual, query),
    }
}

fn compare_bound(value: &Value, bound: &Value) -> Option<Ordering> {
    match (value, bound) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => number(value)?.partial_cmp(&number(bound)?),
    }
}

fn in_range(value: &Value, range: &RangeQuery) -> bool {
    let check = |bound: &Option<Value>, accept: fn(Ordering) -> bool| match bound {
        None => true,
        Some(bound) => compare_bound(value, bound).map_or(false, accept),
    };

    check(&range.gt, Ordering::is_gt)
        && check(&range.gte, Ordering::is_ge)
        && check(&range.lt, Ordering::is_lt)
        && check(&range.lte, Ordering::is_le)
}

/// Geo point as `{"lat": .., "lon": ..}` or `"lat,lon"`
fn geo_point(value: &Value) -> Option<GeoPoint> {
    match value {
        Value::Object(_) => GeoPoint::from_json(value),
        Value::String(s) => {
            let (lat, lon) = s.split_once(',')?;
            Some(GeoPoint::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?))
        }
        _ => None,
    }
}

// =============================================================================
// Sorting
// =============================================================================

fn sort_value(clause: &SortClause, id: &str, source: &Value) -> EngineResult<Value> {
    let value = match clause {
        SortClause::Score { .. } => json!(CONSTANT_SCORE),
        SortClause::Field { field, order } => {
            if field == "_id" {
                return Ok(json!(id));
            }
            let values = field_values(source, field)
                .into_iter()
                .filter(|v| !v.is_object() && !v.is_array());
            let picked = match order {
                SortOrder::Asc => values.min_by(|a, b| compare_values(a, b)),
                SortOrder::Desc => values.max_by(|a, b| compare_values(a, b)),
            };
            picked.cloned().unwrap_or(Value::Null)
        }
        SortClause::GeoDistance {
            field, center, unit, ..
        } => field_values(source, field)
            .into_iter()
            .filter_map(geo_point)
            .map(|point| center.distance_meters(&point) / unit.meters())
            .min_by(|a, b| a.total_cmp(b))
            .map_or(Value::Null, |distance| json!(distance)),
        SortClause::Script { id, .. } => {
            return Err(EngineError::Unsupported(format!("script sort [{}]", id)));
        }
    };
    Ok(value)
}

/// Compare two sort keys clause by clause. Missing values sort last in
/// either direction.
fn compare_keys(clauses: &[SortClause], a: &[Value], b: &[Value]) -> Ordering {
    for (i, clause) in clauses.iter().enumerate() {
        let (Some(left), Some(right)) = (a.get(i), b.get(i)) else {
            break;
        };

        let ordering = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match clause.order() {
                SortOrder::Asc => compare_values(left, right),
                SortOrder::Desc => compare_values(left, right).reverse(),
            },
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Total order over JSON scalars: null < bool < number < string
fn compare_values(a: &Value, b: &Value) -> Ordering {
    let type_order = |v: &Value| -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    };

    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(0.0);
            let b = b.as_f64().unwrap_or(0.0);
            a.total_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => type_order(a).cmp(&type_order(b)),
    }
}

// =============================================================================
// Aggregations
// =============================================================================

/// Bucket key of a scalar value
fn bucket_key(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Terms aggregation result: buckets by descending count, then ascending key
fn terms_buckets(aggregation: &TermsAggregation, sources: &[&Value]) -> Value {
    let mut counts: BTreeMap<String, (Value, u64)> = BTreeMap::new();
    for source in sources {
        let keys: BTreeMap<String, &Value> = field_values(source, &aggregation.field)
            .into_iter()
            .filter_map(|value| bucket_key(value).map(|key| (key, value)))
            .collect();
        for (key, value) in keys {
            counts.entry(key).or_insert_with(|| (value.clone(), 0)).1 += 1;
        }
    }

    let mut buckets: Vec<(Value, u64)> = counts.into_values().collect();
    buckets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| compare_values(&a.0, &b.0)));
    let sum_other: u64 = buckets.iter().skip(aggregation.size).map(|(_, count)| count).sum();
    buckets.truncate(aggregation.size);

    let buckets: Vec<Value> = buckets
        .into_iter()
        .map(|(key, count)| match key {
            Value::Bool(b) => json!({"key": u8::from(b), "key_as_string": b.to_string(), "doc_count": count}),
            key => json!({"key": key, "doc_count": count}),
        })
        .collect();

    json!({
        "doc_count_error_upper_bound": 0,
        "sum_other_doc_count": sum_other,
        "buckets": buckets,
    })
}
