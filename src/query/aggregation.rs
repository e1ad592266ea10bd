//! Group-by translation
//!
//! A group-by expression descends through field names down to a `terms`
//! operator. Every `terms` occurrence yields one independent bucketing
//! aggregation named after its field path.

use serde_json::Value;

use super::dsl::TermsAggregation;
use super::errors::{QueryError, QueryResult};
use crate::path::FieldPath;

/// Bucket count when `first` is absent
pub const DEFAULT_BUCKET_COUNT: usize = 10;

/// Parsed group-by expression, one entry per `terms` operator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupBy {
    terms: Vec<TermsAggregation>,
}

impl GroupBy {
    /// Parse raw group-by input. `null` parses to no aggregations.
    pub fn parse(input: &Value) -> QueryResult<Self> {
        let mut transformer = AggregationTransformer::default();
        if !input.is_null() {
            transformer.apply(input)?;
        }
        Ok(GroupBy {
            terms: transformer.aggregations,
        })
    }

    pub fn aggregations(&self) -> &[TermsAggregation] {
        &self.terms
    }

    pub fn into_aggregations(self) -> Vec<TermsAggregation> {
        self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Compile raw group-by input into terms aggregations
pub fn to_aggregations(input: &Value) -> QueryResult<Vec<TermsAggregation>> {
    GroupBy::parse(input).map(GroupBy::into_aggregations)
}

#[derive(Debug, Default)]
struct AggregationTransformer {
    path: FieldPath,
    aggregations: Vec<TermsAggregation>,
}

impl AggregationTransformer {
    fn apply(&mut self, group_by: &Value) -> QueryResult<()> {
        let object = group_by
            .as_object()
            .ok_or_else(|| QueryError::group_by(self.path.dotted(), "expected an object"))?;

        for (key, value) in object {
            if value.is_null() {
                continue;
            }

            if key == "terms" {
                self.terms(value)?;
            } else {
                self.path.push(key.as_str());
                let result = self.apply(value);
                self.path.pop();
                result?;
            }
        }
        Ok(())
    }

    fn terms(&mut self, input: &Value) -> QueryResult<()> {
        if self.path.is_root() {
            return Err(QueryError::group_by("terms", "operator must be applied to a field"));
        }

        let field = self.path.dotted();
        let size = match input.get("first") {
            None | Some(Value::Null) => DEFAULT_BUCKET_COUNT,
            Some(first) => first
                .as_u64()
                .filter(|n| *n > 0)
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| QueryError::group_by(&field, "first must be a positive integer"))?,
        };

        self.aggregations.push(TermsAggregation {
            name: field.clone(),
            field,
            size,
        });
        Ok(())
    }
}
