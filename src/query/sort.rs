//! Sort translation

use serde::Deserialize;
use serde_json::{Map, Value};

use super::dsl::{DistanceUnit, GeoPoint, SortClause, SortOrder, SCORE_FIELD};
use super::errors::{QueryError, QueryResult};

/// Sort by distance from a point
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SortGeoDistance {
    pub center: GeoPoint,
}

/// Sort by a stored script
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SortScript {
    pub name: String,
    #[serde(rename = "type")]
    pub script_type: String,
    /// Script parameters as a JSON object encoded in a string
    #[serde(default)]
    pub arguments: Option<String>,
}

/// One client sort specification
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub geo_distance: Option<SortGeoDistance>,
    #[serde(default)]
    pub script: Option<SortScript>,
    #[serde(default)]
    pub direction: Option<SortOrder>,
}

impl SortSpec {
    pub fn by_field(field: impl Into<String>, direction: SortOrder) -> Self {
        Self {
            field: Some(field.into()),
            direction: Some(direction),
            ..Default::default()
        }
    }

    /// Parse one raw sort specification
    pub fn parse(input: &Value) -> QueryResult<Self> {
        serde_json::from_value(input.clone()).map_err(|e| QueryError::InvalidSort(e.to_string()))
    }

    /// Parse a raw list of sort specifications. `null` parses to no specs.
    pub fn parse_list(input: &Value) -> QueryResult<Vec<Self>> {
        match input {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items.iter().map(SortSpec::parse).collect(),
            _ => Err(QueryError::InvalidSort("expected a list".into())),
        }
    }

    pub fn direction(&self) -> SortOrder {
        self.direction.unwrap_or_default()
    }
}

/// Translate one sort specification into a native sort clause.
///
/// Geo distance takes precedence over script, script over plain field.
pub fn to_sort(spec: &SortSpec) -> QueryResult<SortClause> {
    let order = spec.direction();

    if let Some(geo) = &spec.geo_distance {
        let field = spec
            .field
            .clone()
            .ok_or_else(|| QueryError::InvalidSort("geoDistance requires field".into()))?;
        return Ok(SortClause::GeoDistance {
            field,
            center: geo.center,
            unit: DistanceUnit::Miles,
            order,
        });
    }

    if let Some(script) = &spec.script {
        return Ok(SortClause::Script {
            id: script.name.clone(),
            script_type: script.script_type.clone(),
            params: script_arguments(script)?,
            order,
        });
    }

    match spec.field.as_deref() {
        Some(SCORE_FIELD) => Ok(SortClause::Score { order }),
        Some(field) => Ok(SortClause::field(field, order)),
        None => Err(QueryError::MissingSortTarget),
    }
}

fn script_arguments(script: &SortScript) -> QueryResult<Map<String, Value>> {
    let Some(arguments) = &script.arguments else {
        return Ok(Map::new());
    };

    match serde_json::from_str(arguments) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(QueryError::InvalidSort(format!(
            "arguments of script {} must be a JSON object",
            script.name
        ))),
        Err(e) => Err(QueryError::InvalidSort(format!(
            "arguments of script {}: {}",
            script.name, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sort(input: Value) -> QueryResult<SortClause> {
        to_sort(&SortSpec::parse(&input)?)
    }

    #[test]
    fn test_field_sort_defaults_to_ascending() {
        assert_eq!(
            sort(json!({"field": "bedrooms"})).unwrap(),
            SortClause::field("bedrooms", SortOrder::Asc)
        );
        assert_eq!(
            sort(json!({"field": "bedrooms", "direction": "DESC"})).unwrap(),
            SortClause::field("bedrooms", SortOrder::Desc)
        );
    }

    #[test]
    fn test_score_sort() {
        assert_eq!(
            sort(json!({"field": "_score", "direction": "DESC"})).unwrap(),
            SortClause::Score { order: SortOrder::Desc }
        );
    }

    #[test]
    fn test_geo_distance_sort() {
        let clause = sort(json!({
            "field": "location",
            "geoDistance": {"center": {"lat": 40.0, "lon": -70.0}},
        }))
        .unwrap();
        assert_eq!(
            clause.to_json(),
            json!({"_geo_distance": {
                "location": {"lat": 40.0, "lon": -70.0},
                "order": "asc",
                "unit": "mi",
            }})
        );

        let err = sort(json!({"geoDistance": {"center": {"lat": 40.0, "lon": -70.0}}})).unwrap_err();
        assert_eq!(err, QueryError::InvalidSort("geoDistance requires field".into()));
    }

    #[test]
    fn test_script_sort() {
        let clause = sort(json!({
            "script": {"name": "popularity", "type": "number", "arguments": "{\"boost\": 2}"},
            "field": "ignored",
            "direction": "DESC",
        }))
        .unwrap();
        assert_eq!(
            clause.to_json(),
            json!({"_script": {
                "type": "number",
                "script": {"id": "popularity", "params": {"boost": 2}},
                "order": "desc",
            }})
        );

        let clause = sort(json!({"script": {"name": "popularity", "type": "number"}})).unwrap();
        assert!(matches!(clause, SortClause::Script { params, .. } if params.is_empty()));

        assert!(sort(json!({"script": {"name": "s", "type": "number", "arguments": "[1]"}})).is_err());
        assert!(sort(json!({"script": {"name": "s", "type": "number", "arguments": "{"}})).is_err());
    }

    #[test]
    fn test_missing_target() {
        assert_eq!(sort(json!({"direction": "ASC"})).unwrap_err(), QueryError::MissingSortTarget);
    }

    #[test]
    fn test_parse_list() {
        assert!(SortSpec::parse_list(&Value::Null).unwrap().is_empty());
        let specs = SortSpec::parse_list(&json!([{"field": "a"}, {"field": "b", "direction": "DESC"}])).unwrap();
        assert_eq!(specs[1], SortSpec::by_field("b", SortOrder::Desc));
        assert!(SortSpec::parse_list(&json!({"field": "a"})).is_err());
        assert!(SortSpec::parse_list(&json!([{"direction": "UP", "field": "a"}])).is_err());
    }
}
