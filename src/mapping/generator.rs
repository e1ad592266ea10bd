//! Index mapping generation
//!
//! Walks each document type and produces the engine's field mapping:
//! - a field is mapped if it is `@searchable` or its type is an object type
//! - an explicit `@searchable(type:)` wins over everything else
//! - object types become `{"properties": {...}}`, `nested` when requested
//! - `GeoPoint` becomes `geo_point`, enums become `keyword`
//! - scalars map through the registered scalar table
//! - object mappings without properties are pruned from their parent

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::schema::scalars::{self, GEO_POINT};
use crate::schema::{FieldDefinition, ProtoSchema, SchemaError, SchemaResult, Searchable};

/// Mapping type of an enum field
const ENUM_MAPPING_TYPE: &str = "keyword";

/// Generates index mappings from a proto schema
pub struct MappingGenerator<'a> {
    schema: &'a ProtoSchema,
}

impl<'a> MappingGenerator<'a> {
    pub fn new(schema: &'a ProtoSchema) -> Self {
        Self { schema }
    }

    /// Generate the mapping of every document type, keyed by type name
    pub fn generate(&self) -> SchemaResult<BTreeMap<String, Value>> {
        self.schema
            .document_types()
            .iter()
            .map(|name| Ok((name.clone(), self.generate_for(name)?)))
            .collect()
    }

    /// Generate the mapping of one document type
    pub fn generate_for(&self, type_name: &str) -> SchemaResult<Value> {
        if !self.schema.is_document_type(type_name) {
            return Err(SchemaError::unknown_document_type(type_name));
        }
        let mut visiting = vec![type_name.to_string()];
        self.object_mapping(type_name, false, &mut visiting)
    }

    fn object_mapping(
        &self,
        type_name: &str,
        nested: bool,
        visiting: &mut Vec<String>,
    ) -> SchemaResult<Value> {
        let registry = self.schema.registry();
        let mut properties = Map::new();

        if let Some(object) = registry.object(type_name) {
            for field in &object.fields {
                let searchable = self.schema.searchable(type_name, &field.name);
                let is_object = registry.is_object_type(field.ty.base_name());
                if searchable.is_none() && !is_object {
                    continue;
                }

                if let Some(mapping) = self.field_mapping(type_name, field, searchable, visiting)? {
                    if !is_empty_object_mapping(&mapping) {
                        properties.insert(field.name.clone(), mapping);
                    }
                }
            }
        }

        let mut node = Map::new();
        if nested {
            node.insert("type".into(), json!("nested"));
        }
        node.insert("properties".into(), Value::Object(properties));
        Ok(Value::Object(node))
    }

    /// Mapping node of one field; `None` when the field closes a type cycle
    fn field_mapping(
        &self,
        owner: &str,
        field: &FieldDefinition,
        searchable: Option<&Searchable>,
        visiting: &mut Vec<String>,
    ) -> SchemaResult<Option<Value>> {
        if let Some(mapped) = searchable.and_then(|s| s.type_override.as_deref()) {
            return Ok(Some(scalar_node(mapped, searchable)));
        }

        let registry = self.schema.registry();
        let field_type = field.ty.base_name();

        if field_type == GEO_POINT {
            return Ok(Some(json!({"type": "geo_point"})));
        }

        if registry.is_object_type(field_type) {
            if visiting.iter().any(|t| t == field_type) {
                return Ok(None);
            }
            visiting.push(field_type.to_string());
            let nested = searchable.map_or(false, Searchable::is_nested);
            let mapping = self.object_mapping(field_type, nested, visiting);
            visiting.pop();
            return mapping.map(Some);
        }

        if registry.is_enum(field_type) {
            return Ok(Some(scalar_node(ENUM_MAPPING_TYPE, searchable)));
        }

        match scalars::lookup(field_type).and_then(|spec| spec.mapped_type) {
            Some(mapped) => Ok(Some(scalar_node(mapped, searchable))),
            None => Err(SchemaError::unsupported_type(owner, &field.name, field_type)),
        }
    }
}

/// `{"type": mapped}` plus the analyzer options of the annotation
fn scalar_node(mapped: &str, searchable: Option<&Searchable>) -> Value {
    let mut node = Map::new();
    node.insert("type".into(), json!(mapped));

    if let Some(searchable) = searchable {
        if let Some(analyzer) = &searchable.analyzer {
            node.insert("analyzer".into(), json!(analyzer));
        }
        if let Some(search_analyzer) = &searchable.search_analyzer {
            node.insert("search_analyzer".into(), json!(search_analyzer));
        }
        if let Some(ignore_above) = searchable.ignore_above {
            node.insert("ignore_above".into(), json!(ignore_above));
        }
    }
    Value::Object(node)
}

/// Object or nested mapping without any properties
fn is_empty_object_mapping(mapping: &Value) -> bool {
    let is_object_type = match mapping.get("type").and_then(Value::as_str) {
        None => true,
        Some(t) => t == "nested" || t == "object",
    };
    is_object_type
        && mapping
            .get("properties")
            .and_then(Value::as_object)
            .map_or(true, Map::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(source: &str, type_name: &str) -> SchemaResult<Value> {
        let schema = ProtoSchema::from_sources([source])?;
        MappingGenerator::new(&schema).generate_for(type_name)
    }

    #[test]
    fn test_scalar_table() {
        let value = mapping(
            r#"
            type Doc @document {
              id: ID! @id @searchable
              flag: Boolean @searchable
              small: Byte @searchable
              ratio: Float @searchable
              at: Instant @searchable
              count: Int @searchable
              big: Long @searchable
              tiny: Short @searchable
              text: String @searchable
            }
            "#,
            "Doc",
        )
        .unwrap();

        assert_eq!(
            value,
            json!({"properties": {
                "id": {"type": "keyword"},
                "flag": {"type": "boolean"},
                "small": {"type": "byte"},
                "ratio": {"type": "double"},
                "at": {"type": "date"},
                "count": {"type": "integer"},
                "big": {"type": "long"},
                "tiny": {"type": "short"},
                "text": {"type": "text"},
            }})
        );
    }

    #[test]
    fn test_boolean_field() {
        let value = mapping("type Doc @document { id: ID @id field: Boolean @searchable }", "Doc").unwrap();
        assert_eq!(value["properties"]["field"], json!({"type": "boolean"}));
    }

    #[test]
    fn test_geo_point_is_not_an_object_mapping() {
        let value = mapping(
            "type Doc @document { id: ID @id location: GeoPoint @searchable plain: GeoPoint }",
            "Doc",
        )
        .unwrap();
        assert_eq!(value["properties"]["location"], json!({"type": "geo_point"}));
        assert_eq!(value["properties"]["plain"], json!({"type": "geo_point"}));
    }

    #[test]
    fn test_override_enum_and_unsearchable_fields() {
        let value = mapping(
            r#"
            type Doc @document {
              id: ID @id
              code: String @searchable(type: "keyword", ignore_above: 64)
              status: Status @searchable
              title: String @searchable(analyzer: "english", search_analyzer: "standard")
              hidden: String
            }
            enum Status { OPEN CLOSED }
            "#,
            "Doc",
        )
        .unwrap();
        assert_eq!(
            value,
            json!({"properties": {
                "code": {"type": "keyword", "ignore_above": 64},
                "status": {"type": "keyword"},
                "title": {"type": "text", "analyzer": "english", "search_analyzer": "standard"},
            }})
        );
    }

    #[test]
    fn test_nested_objects_and_pruning() {
        let value = mapping(
            r#"
            type Doc @document {
              id: ID @id
              property: Property
              rooms: Room @searchable(format: "nested")
              empty: Opaque
            }
            type Property { bedrooms: Int @searchable note: String }
            type Room { size: Float @searchable }
            type Opaque { note: String }
            "#,
            "Doc",
        )
        .unwrap();
        assert_eq!(
            value,
            json!({"properties": {
                "property": {"properties": {"bedrooms": {"type": "integer"}}},
                "rooms": {"type": "nested", "properties": {"size": {"type": "double"}}},
            }})
        );
    }

    #[test]
    fn test_unsupported_type() {
        let err = mapping("type Doc @document { id: ID @id amount: BigDecimal @searchable }", "Doc")
            .unwrap_err();
        assert_eq!(err.code().code(), "SEARCH_SCHEMA_UNSUPPORTED_TYPE");
        assert!(err.message().contains("BigDecimal"));
    }

    #[test]
    fn test_cyclic_object_graph_terminates() {
        let value = mapping(
            "type Doc @document { id: ID @id @searchable parent: Doc }",
            "Doc",
        )
        .unwrap();
        assert_eq!(value, json!({"properties": {"id": {"type": "keyword"}}}));
    }

    #[test]
    fn test_unknown_document_type() {
        let schema = ProtoSchema::from_sources(["type Doc @document { id: ID @id }"]).unwrap();
        let err = MappingGenerator::new(&schema).generate_for("Bucket").unwrap_err();
        assert_eq!(err.code().code(), "SEARCH_SCHEMA_UNKNOWN_DOCUMENT_TYPE");
    }

    #[test]
    fn test_generate_all() {
        let schema = ProtoSchema::from_sources([
            "type A @document { id: ID @id } type B @document { id: ID @id }",
        ])
        .unwrap();
        let mappings = MappingGenerator::new(&schema).generate().unwrap();
        assert_eq!(mappings.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
