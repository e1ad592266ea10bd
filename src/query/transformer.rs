//! Filter translation
//!
//! Compiles a parsed [`Filter`] into a native [`Query`]:
//! - entries of one filter object hold conjunctively
//! - `and`, `or` and `not` compile each element independently, then combine
//!   them as all-of, at-least-one-of and none-of; an empty list adds nothing
//! - `gt`/`gte`/`lt`/`lte` of one filter object accumulate into a single range
//!   clause, emitted once the object is done
//! - an empty filter compiles to match-all

use serde_json::Value;

use super::dsl::{BoolQuery, Query, RangeQuery};
use super::errors::QueryResult;
use super::filter::{Condition, Filter, FilterExpr};
use crate::path::FieldPath;

/// Compile raw filter input into a native query
pub fn to_query(input: &Value) -> QueryResult<Query> {
    Ok(QueryTransformer::transform(&Filter::parse(input)?))
}

/// Per-call compiler state: the query accumulated so far
#[derive(Debug, Default)]
pub struct QueryTransformer {
    query: Query,
}

impl QueryTransformer {
    /// Compile a parsed filter
    pub fn transform(filter: &Filter) -> Query {
        let mut transformer = QueryTransformer::default();
        transformer.apply(filter);
        transformer.query
    }

    fn merge(&mut self, clause: Query) {
        let current = std::mem::take(&mut self.query);
        self.query = current.and(clause);
    }

    fn apply(&mut self, filter: &Filter) {
        let mut range: Option<RangeQuery> = None;

        for expr in filter.entries() {
            match expr {
                FilterExpr::And(filters) => {
                    self.combine(filters, |query, clause| query.must(clause));
                }
                FilterExpr::Or(filters) => {
                    self.combine(filters, |query, clause| {
                        query.should(clause).minimum_should_match(1)
                    });
                }
                FilterExpr::Not(filters) => {
                    self.combine(filters, |query, clause| query.must_not(clause));
                }
                FilterExpr::FieldDescent { child, .. } => self.apply(child),
                FilterExpr::FieldOp { path, condition } => {
                    self.condition(path, condition, &mut range);
                }
            }
        }

        if let Some(range) = range {
            self.merge(Query::Range(range));
        }
    }

    fn combine(&mut self, filters: &[Filter], add: impl Fn(BoolQuery, Query) -> BoolQuery) {
        if filters.is_empty() {
            return;
        }

        let query = filters
            .iter()
            .map(QueryTransformer::transform)
            .fold(BoolQuery::new(), add);
        self.merge(Query::Bool(query));
    }

    fn condition(&mut self, path: &FieldPath, condition: &Condition, range: &mut Option<RangeQuery>) {
        let field = path.dotted();

        match condition {
            Condition::Contains(values) => {
                if values.is_empty() {
                    return;
                }
                let query = values.iter().fold(BoolQuery::new().minimum_should_match(1), |query, value| {
                    query.should(Query::Match {
                        field: field.clone(),
                        query: value.clone(),
                    })
                });
                self.merge(Query::Bool(query));
            }
            Condition::Eq(value) => self.merge(Query::Term {
                field,
                value: value.clone(),
            }),
            Condition::Exists(true) => self.merge(Query::Exists { field }),
            Condition::Exists(false) => {
                self.merge(Query::Bool(BoolQuery::new().must_not(Query::Exists { field })))
            }
            Condition::GeoDistance(geo) => self.merge(Query::GeoDistance {
                field,
                center: geo.center,
                distance: geo.lte,
                unit: geo.unit(),
            }),
            Condition::In(values) => self.merge(Query::Terms {
                field,
                values: values.clone(),
            }),
            Condition::Gt(value) => range_for(range, field).gt = Some(value.clone()),
            Condition::Gte(value) => range_for(range, field).gte = Some(value.clone()),
            Condition::Lt(value) => range_for(range, field).lt = Some(value.clone()),
            Condition::Lte(value) => range_for(range, field).lte = Some(value.clone()),
        }
    }
}

fn range_for(range: &mut Option<RangeQuery>, field: String) -> &mut RangeQuery {
    range.get_or_insert_with(|| RangeQuery::new(field))
}
