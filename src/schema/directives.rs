//! Directive resolution
//!
//! Interprets the three schema annotations once, producing plain data consumed
//! by every downstream generator and translator:
//! - `@document` marks an object type whose instances are indexed
//! - `@id` marks the (possibly nested) field supplying the document id
//! - `@searchable` marks a field as filterable and mapped

use std::collections::{BTreeMap, BTreeSet};

use crate::path::FieldPath;

use super::errors::{SchemaError, SchemaResult};
use super::registry::TypeRegistry;
use super::types::{find_directive, ConstValue, Directive, FieldDefinition};

pub const DOCUMENT_DIRECTIVE: &str = "document";
pub const ID_DIRECTIVE: &str = "id";
pub const SEARCHABLE_DIRECTIVE: &str = "searchable";

/// Object mapping format that indexes sub-objects as nested documents
pub const NESTED_FORMAT: &str = "nested";

/// Arguments of a `@searchable` annotation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Searchable {
    /// Explicit mapping type overriding the scalar table
    pub type_override: Option<String>,
    pub analyzer: Option<String>,
    pub search_analyzer: Option<String>,
    /// `nested` indexes an object field as nested documents
    pub format: Option<String>,
    pub ignore_above: Option<i64>,
}

impl Searchable {
    /// Returns true if the field is indexed as nested documents
    pub fn is_nested(&self) -> bool {
        self.format.as_deref() == Some(NESTED_FORMAT)
    }
}

/// Annotations found on one field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAnnotations {
    pub searchable: Option<Searchable>,
    pub is_id: bool,
}

/// Result of directive resolution
#[derive(Debug, Clone, Default)]
pub struct ResolvedDirectives {
    /// Object types marked `@document`
    pub document_types: BTreeSet<String>,
    /// Path from each document type to its identifier field
    pub id_paths: BTreeMap<String, FieldPath>,
    /// Annotations keyed by (type name, field name); unannotated fields are absent
    pub fields: BTreeMap<(String, String), FieldAnnotations>,
}

/// Returns true if an object type carries `@document`
pub fn is_document(directives: &[Directive]) -> bool {
    find_directive(directives, DOCUMENT_DIRECTIVE).is_some()
}

/// Returns true if a field carries `@id`
pub fn is_id(field: &FieldDefinition) -> bool {
    find_directive(&field.directives, ID_DIRECTIVE).is_some()
}

/// Resolves annotations over a type registry
pub struct DirectiveResolver<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> DirectiveResolver<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Resolve document types, identifier paths and field annotations.
    ///
    /// Fails if a document type has no reachable `@id` field or if a
    /// `@searchable` argument has the wrong shape.
    pub fn resolve(&self) -> SchemaResult<ResolvedDirectives> {
        let mut resolved = ResolvedDirectives::default();

        for object in self.registry.objects() {
            if is_document(&object.directives) {
                resolved.document_types.insert(object.name.clone());
            }

            for field in &object.fields {
                let annotations = FieldAnnotations {
                    searchable: self.searchable_of(&object.name, field)?,
                    is_id: is_id(field),
                };
                if annotations != FieldAnnotations::default() {
                    resolved
                        .fields
                        .insert((object.name.clone(), field.name.clone()), annotations);
                }
            }
        }

        for document_type in &resolved.document_types {
            let mut path = FieldPath::root();
            let mut visiting = vec![document_type.clone()];
            if !self.find_id_path(document_type, &mut path, &mut visiting) {
                return Err(SchemaError::missing_id(document_type.clone()));
            }
            resolved.id_paths.insert(document_type.clone(), path);
        }

        Ok(resolved)
    }

    /// Depth-first search for the `@id` field; the first match wins.
    ///
    /// On success `path` holds the full path to the identifier field.
    fn find_id_path(&self, type_name: &str, path: &mut FieldPath, visiting: &mut Vec<String>) -> bool {
        let Some(object) = self.registry.object(type_name) else {
            return false;
        };

        for field in &object.fields {
            path.push(field.name.clone());
            if is_id(field) {
                return true;
            }

            let field_type = field.ty.base_name();
            if self.registry.is_object_type(field_type) && !visiting.iter().any(|t| t == field_type) {
                visiting.push(field_type.to_string());
                if self.find_id_path(field_type, path, visiting) {
                    return true;
                }
                visiting.pop();
            }
            path.pop();
        }
        false
    }

    fn searchable_of(&self, type_name: &str, field: &FieldDefinition) -> SchemaResult<Option<Searchable>> {
        let Some(directive) = find_directive(&field.directives, SEARCHABLE_DIRECTIVE) else {
            return Ok(None);
        };

        let string_arg = |name: &str| -> SchemaResult<Option<String>> {
            match directive.argument(name) {
                None | Some(ConstValue::Null) => Ok(None),
                Some(ConstValue::String(s)) => Ok(Some(s.clone())),
                Some(other) => Err(SchemaError::invalid_directive(
                    type_name,
                    &field.name,
                    format!("@searchable({}:) expects a string, got {}", name, other),
                )),
            }
        };

        let ignore_above = match directive.argument("ignore_above") {
            None | Some(ConstValue::Null) => None,
            Some(ConstValue::Int(n)) if *n >= 0 => Some(*n),
            Some(other) => {
                return Err(SchemaError::invalid_directive(
                    type_name,
                    &field.name,
                    format!("@searchable(ignore_above:) expects a non-negative integer, got {}", other),
                ))
            }
        };

        Ok(Some(Searchable {
            type_override: string_arg("type")?,
            analyzer: string_arg("analyzer")?,
            search_analyzer: string_arg("search_analyzer")?,
            format: string_arg("format")?,
            ignore_above,
        }))
    }
}
