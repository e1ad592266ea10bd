//! Native search engine query algebra
//!
//! Typed rendition of the engine's query, sort and aggregation clauses. Each
//! clause renders to the engine's JSON wire shape with `to_json`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Mean Earth radius used for distance computations
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Field name that sorts by relevance score
pub const SCORE_FIELD: &str = "_score";

// =============================================================================
// Geo
// =============================================================================

/// Unit of a geo distance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[serde(rename = "KILOMETERS", alias = "kilometers", alias = "km")]
    Kilometers,
    #[default]
    #[serde(rename = "MILES", alias = "miles", alias = "mi")]
    Miles,
}

impl DistanceUnit {
    /// Suffix used in distance strings, e.g. `10mi`
    pub fn suffix(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
        }
    }

    pub fn meters(&self) -> f64 {
        match self {
            DistanceUnit::Kilometers => 1_000.0,
            DistanceUnit::Miles => 1_609.344,
        }
    }
}

/// Latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Read a `{"lat": .., "lon": ..}` object
    pub fn from_json(value: &Value) -> Option<Self> {
        Some(Self {
            lat: value.get("lat")?.as_f64()?,
            lon: value.get("lon")?.as_f64()?,
        })
    }

    pub fn to_json(&self) -> Value {
        json!({"lat": self.lat, "lon": self.lon})
    }

    /// Great-circle distance in meters (haversine)
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }
}

// =============================================================================
// Queries
// =============================================================================

/// Bounds on one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeQuery {
    pub field: String,
    pub gt: Option<Value>,
    pub gte: Option<Value>,
    pub lt: Option<Value>,
    pub lte: Option<Value>,
}

impl RangeQuery {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Default::default()
        }
    }

    fn to_json(&self) -> Value {
        let mut bounds = Map::new();
        for (name, bound) in [
            ("gt", &self.gt),
            ("gte", &self.gte),
            ("lt", &self.lt),
            ("lte", &self.lte),
        ] {
            if let Some(value) = bound {
                bounds.insert(name.into(), value.clone());
            }
        }

        let mut range = Map::new();
        range.insert(self.field.clone(), Value::Object(bounds));
        json!({ "range": range })
    }
}

/// Boolean combination of queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Query>,
    pub should: Vec<Query>,
    pub must_not: Vec<Query>,
    pub minimum_should_match: Option<u32>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: Query) -> Self {
        self.must.push(query);
        self
    }

    pub fn should(mut self, query: Query) -> Self {
        self.should.push(query);
        self
    }

    pub fn must_not(mut self, query: Query) -> Self {
        self.must_not.push(query);
        self
    }

    pub fn minimum_should_match(mut self, count: u32) -> Self {
        self.minimum_should_match = Some(count);
        self
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        for (name, clauses) in [
            ("must", &self.must),
            ("should", &self.should),
            ("must_not", &self.must_not),
        ] {
            if !clauses.is_empty() {
                body.insert(name.into(), clauses.iter().map(Query::to_json).collect());
            }
        }
        if let Some(count) = self.minimum_should_match {
            body.insert("minimum_should_match".into(), json!(count));
        }
        json!({ "bool": body })
    }
}

/// Native query clause
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Query {
    #[default]
    MatchAll,
    Term {
        field: String,
        value: Value,
    },
    Terms {
        field: String,
        values: Vec<Value>,
    },
    Match {
        field: String,
        query: Value,
    },
    Exists {
        field: String,
    },
    Range(RangeQuery),
    GeoDistance {
        field: String,
        center: GeoPoint,
        distance: f64,
        unit: DistanceUnit,
    },
    Bool(BoolQuery),
}

impl Query {
    pub fn is_match_all(&self) -> bool {
        matches!(self, Query::MatchAll)
    }

    /// Conjoin another constraint onto this query.
    ///
    /// Match-all is replaced, a bool query gains a `must` clause and anything
    /// else is wrapped in a new bool query with both as `must`.
    pub fn and(self, other: Query) -> Query {
        match self {
            Query::MatchAll => other,
            Query::Bool(query) => Query::Bool(query.must(other)),
            query => Query::Bool(BoolQuery::new().must(query).must(other)),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Query::MatchAll => json!({"match_all": {}}),
            Query::Term { field, value } => json!({"term": {field.as_str(): {"value": value}}}),
            Query::Terms { field, values } => json!({"terms": {field.as_str(): values}}),
            Query::Match { field, query } => json!({"match": {field.as_str(): {"query": query}}}),
            Query::Exists { field } => json!({"exists": {"field": field}}),
            Query::Range(range) => range.to_json(),
            Query::GeoDistance {
                field,
                center,
                distance,
                unit,
            } => json!({"geo_distance": {
                "distance": format!("{}{}", distance, unit.suffix()),
                field.as_str(): center.to_json(),
            }}),
            Query::Bool(query) => query.to_json(),
        }
    }
}

// =============================================================================
// Sorting
// =============================================================================

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Native sort clause
#[derive(Debug, Clone, PartialEq)]
pub enum SortClause {
    Score {
        order: SortOrder,
    },
    Field {
        field: String,
        order: SortOrder,
    },
    GeoDistance {
        field: String,
        center: GeoPoint,
        unit: DistanceUnit,
        order: SortOrder,
    },
    /// Sort by a stored script
    Script {
        id: String,
        script_type: String,
        params: Map<String, Value>,
        order: SortOrder,
    },
}

impl SortClause {
    pub fn field(field: impl Into<String>, order: SortOrder) -> Self {
        SortClause::Field {
            field: field.into(),
            order,
        }
    }

    pub fn order(&self) -> SortOrder {
        match self {
            SortClause::Score { order }
            | SortClause::Field { order, .. }
            | SortClause::GeoDistance { order, .. }
            | SortClause::Script { order, .. } => *order,
        }
    }

    /// True if this is a plain field sort on `field`
    pub fn sorts_by_field(&self, name: &str) -> bool {
        matches!(self, SortClause::Field { field, .. } if field == name)
    }

    pub fn to_json(&self) -> Value {
        let order = self.order().as_str();
        match self {
            SortClause::Score { .. } => json!({SCORE_FIELD: {"order": order}}),
            SortClause::Field { field, .. } => json!({field.as_str(): {"order": order}}),
            SortClause::GeoDistance {
                field, center, unit, ..
            } => json!({"_geo_distance": {
                field.as_str(): center.to_json(),
                "order": order,
                "unit": unit.suffix(),
            }}),
            SortClause::Script {
                id,
                script_type,
                params,
                ..
            } => json!({"_script": {
                "type": script_type,
                "script": {"id": id, "params": params},
                "order": order,
            }}),
        }
    }
}

// =============================================================================
// Aggregations
// =============================================================================

/// Bucketing aggregation on the distinct values of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermsAggregation {
    /// Aggregation name, the dot-joined field path
    pub name: String,
    pub field: String,
    /// Maximum number of buckets
    pub size: usize,
}

impl TermsAggregation {
    pub fn to_json(&self) -> Value {
        json!({"terms": {"field": self.field, "size": self.size}})
    }
}
