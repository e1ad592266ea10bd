//! Index creation body and the ingestion timestamp field

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};

/// System field recording when a document was put in the index
pub const TIMESTAMP_FIELD: &str = "@timestamp";

/// Build an index creation body from a document mapping.
///
/// The mapping gets `dynamic: false` and the `@timestamp` date field, then is
/// placed under `mappings` next to the engine-level `settings`.
pub fn index_body(mapping: &Value, settings: &Value) -> Value {
    let mut mappings = match mapping {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    mappings.insert("dynamic".into(), Value::Bool(false));

    let properties = mappings
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(properties) = properties {
        properties.insert(TIMESTAMP_FIELD.into(), json!({"type": "date"}));
    }

    json!({
        "settings": settings,
        "mappings": Value::Object(mappings),
    })
}

/// Current time in the timestamp field's format
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Stamp a document with the current time
pub fn stamp(document: &mut Map<String, Value>) {
    document.insert(TIMESTAMP_FIELD.into(), Value::String(timestamp_now()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_index_body() {
        let mapping = json!({"properties": {"bedrooms": {"type": "integer"}}});
        let settings = json!({"number_of_shards": 1});
        assert_eq!(
            index_body(&mapping, &settings),
            json!({
                "settings": {"number_of_shards": 1},
                "mappings": {
                    "dynamic": false,
                    "properties": {
                        "bedrooms": {"type": "integer"},
                        "@timestamp": {"type": "date"},
                    },
                },
            })
        );
    }

    #[test]
    fn test_stamp() {
        let mut document = Map::new();
        stamp(&mut document);
        let value = document[TIMESTAMP_FIELD].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(value).is_ok());
    }
}
