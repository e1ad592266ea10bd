//! Proto schema
//!
//! The immutable result of parsing the schema sources and resolving their
//! directives. Built once per schema version and shared read-only by the
//! mapping generator, the consumer schema generator and the translators.

use std::collections::BTreeSet;

use tracing::info;

use crate::path::FieldPath;

use super::directives::{DirectiveResolver, FieldAnnotations, ResolvedDirectives, Searchable};
use super::errors::{SchemaError, SchemaResult};
use super::parser::parse_document;
use super::registry::TypeRegistry;

/// Definitions merged into every schema before the user sources
pub const PRELUDE: &str = r#"
directive @document on OBJECT

directive @id on FIELD_DEFINITION

directive @searchable(
  type: String
  analyzer: String
  search_analyzer: String
  format: String
  ignore_above: Int
) on FIELD_DEFINITION

type Aggregation {
  groupBy: String!
  buckets: [Bucket!]!
}

type Bucket {
  key: String!
  count: Long!
  aggregations: [Aggregation!]!
}

type PageInfo {
  hasPreviousPage: Boolean!
  hasNextPage: Boolean!
  startCursor: String
  endCursor: String
}

enum DistanceUnit {
  KILOMETERS
  MILES
}

input GeoDistanceRangeInput {
  center: GeoPointInput!
  lte: Float!
  unit: DistanceUnit
}

type GeoPoint {
  lat: Float!
  lon: Float!
}

input TermsAggregationInput {
  first: Int
}

enum SortDirection {
  ASC
  DESC
}

input SortGeoDistanceInput {
  center: GeoPointInput!
}

input SortScriptInput {
  name: String!
  type: String!
  arguments: String
}

input SortFieldInput {
  field: String
  geoDistance: SortGeoDistanceInput
  script: SortScriptInput
  direction: SortDirection
}
"#;

/// Create a registry holding the registered scalars and the prelude
pub fn prelude_registry() -> SchemaResult<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    registry.add_document(parse_document(PRELUDE)?)?;
    Ok(registry)
}

/// Parsed and resolved schema for one schema version
#[derive(Debug, Clone)]
pub struct ProtoSchema {
    registry: TypeRegistry,
    resolved: ResolvedDirectives,
}

impl ProtoSchema {
    /// Build from schema source texts, merged after the prelude
    pub fn from_sources<I, S>(sources: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = prelude_registry()?;
        for source in sources {
            registry.add_document(parse_document(source.as_ref())?)?;
        }
        registry.resolve_extensions()?;
        Self::build(registry)
    }

    /// Resolve directives over a complete registry
    pub fn build(registry: TypeRegistry) -> SchemaResult<Self> {
        let resolved = DirectiveResolver::new(&registry).resolve()?;

        info!(
            type_count = registry.type_count(),
            document_types = ?resolved.document_types,
            "Proto schema built"
        );

        Ok(Self { registry, resolved })
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Document type names in name order
    pub fn document_types(&self) -> &BTreeSet<String> {
        &self.resolved.document_types
    }

    pub fn is_document_type(&self, type_name: &str) -> bool {
        self.resolved.document_types.contains(type_name)
    }

    /// Path from a document type to its identifier field
    pub fn id_path(&self, type_name: &str) -> SchemaResult<&FieldPath> {
        self.resolved
            .id_paths
            .get(type_name)
            .ok_or_else(|| SchemaError::unknown_document_type(type_name))
    }

    /// Dot-joined identifier field of a document type
    pub fn id_field(&self, type_name: &str) -> SchemaResult<String> {
        self.id_path(type_name).map(FieldPath::dotted)
    }

    /// Annotations on one field, if any
    pub fn annotations(&self, type_name: &str, field: &str) -> Option<&FieldAnnotations> {
        self.resolved
            .fields
            .get(&(type_name.to_string(), field.to_string()))
    }

    /// `@searchable` arguments on one field, if the field is searchable
    pub fn searchable(&self, type_name: &str, field: &str) -> Option<&Searchable> {
        self.annotations(type_name, field)
            .and_then(|a| a.searchable.as_ref())
    }

    pub fn is_searchable(&self, type_name: &str, field: &str) -> bool {
        self.searchable(type_name, field).is_some()
    }
}
