//! Filter expression tree
//!
//! Client filter input is a nested JSON object. Keys are structural operators
//! (`and`, `or`, `not`), leaf operators (`eq`, `exists`, `gt`, ...) or field
//! names descending one level into the document. The raw object is parsed
//! once into a typed tree; compiling the tree is the translator's job.
//!
//! Null-valued entries are ignored, matching the input semantics of an
//! omitted argument.

use serde::Deserialize;
use serde_json::Value;

use super::dsl::{DistanceUnit, GeoPoint};
use super::errors::{QueryError, QueryResult};
use crate::path::FieldPath;

/// Leaf operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Contains,
    Eq,
    Exists,
    GeoDistance,
    Gt,
    Gte,
    In,
    Lt,
    Lte,
}

impl FilterOperator {
    /// Operator for an input key, if the key names one
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "contains" => Some(FilterOperator::Contains),
            "eq" => Some(FilterOperator::Eq),
            "exists" => Some(FilterOperator::Exists),
            "geo_distance" | "geoDistance" => Some(FilterOperator::GeoDistance),
            "gt" => Some(FilterOperator::Gt),
            "gte" => Some(FilterOperator::Gte),
            "in" => Some(FilterOperator::In),
            "lt" => Some(FilterOperator::Lt),
            "lte" => Some(FilterOperator::Lte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Contains => "contains",
            FilterOperator::Eq => "eq",
            FilterOperator::Exists => "exists",
            FilterOperator::GeoDistance => "geo_distance",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::In => "in",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
        }
    }
}

/// Parameters of the geo distance operator
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoDistanceRange {
    pub center: GeoPoint,
    /// Maximum distance from the center
    pub lte: f64,
    #[serde(default)]
    pub unit: Option<DistanceUnit>,
}

impl GeoDistanceRange {
    pub fn unit(&self) -> DistanceUnit {
        self.unit.unwrap_or_default()
    }
}

/// Typed operand of a leaf operator
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Contains(Vec<Value>),
    Eq(Value),
    Exists(bool),
    GeoDistance(GeoDistanceRange),
    Gt(Value),
    Gte(Value),
    In(Vec<Value>),
    Lt(Value),
    Lte(Value),
}

/// One entry of a filter object
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Vec<Filter>),
    /// Leaf operator applied at a field path
    FieldOp { path: FieldPath, condition: Condition },
    /// Descent into a named field
    FieldDescent { name: String, child: Filter },
}

/// One filter object: its entries hold conjunctively
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    entries: Vec<FilterExpr>,
}

impl Filter {
    /// Parse raw filter input. `null` parses to the empty filter.
    pub fn parse(input: &Value) -> QueryResult<Self> {
        match input {
            Value::Null => Ok(Filter::default()),
            other => parse_object(other, &mut FieldPath::root()),
        }
    }

    pub fn entries(&self) -> &[FilterExpr] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_object(input: &Value, path: &mut FieldPath) -> QueryResult<Filter> {
    let object = input
        .as_object()
        .ok_or_else(|| QueryError::filter(path.dotted(), "expected an object"))?;

    let mut entries = Vec::with_capacity(object.len());
    for (key, value) in object {
        if value.is_null() {
            continue;
        }

        let expr = match key.as_str() {
            "and" => FilterExpr::And(parse_list(key, value, path)?),
            "or" => FilterExpr::Or(parse_list(key, value, path)?),
            "not" => FilterExpr::Not(parse_list(key, value, path)?),
            _ => match FilterOperator::from_key(key) {
                Some(operator) => {
                    if path.is_root() {
                        return Err(QueryError::filter(
                            key.as_str(),
                            "operator must be applied to a field",
                        ));
                    }
                    FilterExpr::FieldOp {
                        path: path.clone(),
                        condition: parse_condition(operator, value, path)?,
                    }
                }
                None => {
                    path.push(key.as_str());
                    let child = parse_object(value, path);
                    path.pop();
                    FilterExpr::FieldDescent {
                        name: key.clone(),
                        child: child?,
                    }
                }
            },
        };
        entries.push(expr);
    }
    Ok(Filter { entries })
}

/// Elements of `and`/`or`/`not`, each an independent filter at the current path
fn parse_list(key: &str, value: &Value, path: &mut FieldPath) -> QueryResult<Vec<Filter>> {
    let items = value
        .as_array()
        .ok_or_else(|| QueryError::filter(path.dotted(), format!("{} expects a list", key)))?;
    items.iter().map(|item| parse_object(item, path)).collect()
}

fn parse_condition(operator: FilterOperator, value: &Value, path: &FieldPath) -> QueryResult<Condition> {
    let invalid = |reason: &str| QueryError::filter(path.dotted(), format!("{} {}", operator.as_str(), reason));

    let condition = match operator {
        FilterOperator::Contains => Condition::Contains(list(value).ok_or_else(|| invalid("expects a list"))?),
        FilterOperator::In => Condition::In(list(value).ok_or_else(|| invalid("expects a list"))?),
        FilterOperator::Exists => {
            Condition::Exists(value.as_bool().ok_or_else(|| invalid("expects a boolean"))?)
        }
        FilterOperator::GeoDistance => {
            let range = serde_json::from_value(value.clone()).map_err(|e| invalid(&e.to_string()))?;
            Condition::GeoDistance(range)
        }
        FilterOperator::Eq => Condition::Eq(value.clone()),
        FilterOperator::Gt => Condition::Gt(value.clone()),
        FilterOperator::Gte => Condition::Gte(value.clone()),
        FilterOperator::Lt => Condition::Lt(value.clone()),
        FilterOperator::Lte => Condition::Lte(value.clone()),
    };
    Ok(condition)
}

fn list(value: &Value) -> Option<Vec<Value>> {
    value.as_array().cloned()
}
