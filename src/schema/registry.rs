//! Type registry
//!
//! Holds every type and directive definition parsed from the schema sources.
//! Definitions are kept in name order so every walk over the registry is
//! deterministic.

use std::collections::BTreeMap;

use super::errors::{SchemaError, SchemaResult};
use super::scalars::SCALARS;
use super::types::*;

/// Category of a named type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Object,
    InputObject,
    Enum,
    Scalar,
}

/// Registry of parsed type definitions
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    objects: BTreeMap<String, ObjectTypeDefinition>,
    inputs: BTreeMap<String, InputObjectTypeDefinition>,
    enums: BTreeMap<String, EnumTypeDefinition>,
    scalars: BTreeMap<String, ScalarTypeDefinition>,
    directives: BTreeMap<String, DirectiveDefinition>,
    pending_extensions: Vec<ObjectTypeDefinition>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry holding the registered scalar types
    pub fn new() -> Self {
        let scalars = SCALARS
            .iter()
            .map(|spec| {
                (
                    spec.name.to_string(),
                    ScalarTypeDefinition {
                        description: None,
                        name: spec.name.to_string(),
                        directives: Vec::new(),
                    },
                )
            })
            .collect();

        Self {
            objects: BTreeMap::new(),
            inputs: BTreeMap::new(),
            enums: BTreeMap::new(),
            scalars,
            directives: BTreeMap::new(),
            pending_extensions: Vec::new(),
        }
    }

    /// Merge a parsed document into the registry.
    ///
    /// Extensions whose base type is not defined yet are queued until
    /// [`TypeRegistry::resolve_extensions`].
    pub fn add_document(&mut self, document: Document) -> SchemaResult<()> {
        for definition in document.definitions {
            self.add_definition(definition)?;
        }
        Ok(())
    }

    fn add_definition(&mut self, definition: Definition) -> SchemaResult<()> {
        match definition {
            Definition::Object(def) => {
                self.ensure_new_type(&def.name)?;
                self.objects.insert(def.name.clone(), def);
            }
            Definition::ObjectExtension(ext) => match self.objects.get_mut(&ext.name) {
                Some(base) => merge_extension(base, ext),
                None => self.pending_extensions.push(ext),
            },
            Definition::InputObject(def) => {
                self.ensure_new_type(&def.name)?;
                self.inputs.insert(def.name.clone(), def);
            }
            Definition::Enum(def) => {
                self.ensure_new_type(&def.name)?;
                self.enums.insert(def.name.clone(), def);
            }
            Definition::Scalar(def) => {
                // Registered scalars may be redeclared in a source
                if self.scalars.contains_key(&def.name) {
                    self.scalars.insert(def.name.clone(), def);
                } else {
                    self.ensure_new_type(&def.name)?;
                    self.scalars.insert(def.name.clone(), def);
                }
            }
            Definition::Directive(def) => {
                if self.directives.contains_key(&def.name) {
                    return Err(SchemaError::duplicate_type(format!("@{}", def.name)));
                }
                self.directives.insert(def.name.clone(), def);
            }
        }
        Ok(())
    }

    fn ensure_new_type(&self, name: &str) -> SchemaResult<()> {
        if self.kind(name).is_some() {
            return Err(SchemaError::duplicate_type(name));
        }
        Ok(())
    }

    /// Apply queued extensions; fails if any base type is still undefined
    pub fn resolve_extensions(&mut self) -> SchemaResult<()> {
        for ext in std::mem::take(&mut self.pending_extensions) {
            match self.objects.get_mut(&ext.name) {
                Some(base) => merge_extension(base, ext),
                None => return Err(SchemaError::unresolved_extension(ext.name)),
            }
        }
        Ok(())
    }

    /// Category of a named type, if defined
    pub fn kind(&self, name: &str) -> Option<TypeKind> {
        if self.objects.contains_key(name) {
            Some(TypeKind::Object)
        } else if self.inputs.contains_key(name) {
            Some(TypeKind::InputObject)
        } else if self.enums.contains_key(name) {
            Some(TypeKind::Enum)
        } else if self.scalars.contains_key(name) {
            Some(TypeKind::Scalar)
        } else {
            None
        }
    }

    pub fn is_object_type(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub fn is_scalar(&self, name: &str) -> bool {
        self.scalars.contains_key(name)
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    pub fn object(&self, name: &str) -> Option<&ObjectTypeDefinition> {
        self.objects.get(name)
    }

    pub fn input(&self, name: &str) -> Option<&InputObjectTypeDefinition> {
        self.inputs.get(name)
    }

    pub fn enumeration(&self, name: &str) -> Option<&EnumTypeDefinition> {
        self.enums.get(name)
    }

    pub fn directive(&self, name: &str) -> Option<&DirectiveDefinition> {
        self.directives.get(name)
    }

    /// Object types in name order
    pub fn objects(&self) -> impl Iterator<Item = &ObjectTypeDefinition> {
        self.objects.values()
    }

    /// Input object types in name order
    pub fn inputs(&self) -> impl Iterator<Item = &InputObjectTypeDefinition> {
        self.inputs.values()
    }

    /// Enum types in name order
    pub fn enums(&self) -> impl Iterator<Item = &EnumTypeDefinition> {
        self.enums.values()
    }

    /// Scalar types in name order
    pub fn scalars(&self) -> impl Iterator<Item = &ScalarTypeDefinition> {
        self.scalars.values()
    }

    /// Directive definitions in name order
    pub fn directives(&self) -> impl Iterator<Item = &DirectiveDefinition> {
        self.directives.values()
    }

    /// Total number of named types
    pub fn type_count(&self) -> usize {
        self.objects.len() + self.inputs.len() + self.enums.len() + self.scalars.len()
    }
}

fn merge_extension(base: &mut ObjectTypeDefinition, ext: ObjectTypeDefinition) {
    for interface in ext.implements {
        if !base.implements.contains(&interface) {
            base.implements.push(interface);
        }
    }
    base.directives.extend(ext.directives);
    base.fields.extend(ext.fields);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parser::parse_document;

    fn registry(sources: &[&str]) -> SchemaResult<TypeRegistry> {
        let mut registry = TypeRegistry::new();
        for source in sources {
            registry.add_document(parse_document(source)?)?;
        }
        registry.resolve_extensions()?;
        Ok(registry)
    }

    #[test]
    fn test_registered_scalars_present() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.kind("Long"), Some(TypeKind::Scalar));
        assert_eq!(registry.kind("String"), Some(TypeKind::Scalar));
        assert_eq!(registry.kind("Listing"), None);
    }

    #[test]
    fn test_kinds() {
        let registry = registry(&[
            "type Listing { id: ID }",
            "input Window { from: Int }",
            "enum Status { ACTIVE }",
            "scalar Money",
        ])
        .unwrap();
        assert_eq!(registry.kind("Listing"), Some(TypeKind::Object));
        assert_eq!(registry.kind("Window"), Some(TypeKind::InputObject));
        assert_eq!(registry.kind("Status"), Some(TypeKind::Enum));
        assert_eq!(registry.kind("Money"), Some(TypeKind::Scalar));
        assert!(registry.is_object_type("Listing"));
    }

    #[test]
    fn test_extension_before_base_is_queued() {
        let registry = registry(&[
            "extend type Listing { status: String }",
            "type Listing { id: ID }",
        ])
        .unwrap();
        let fields: Vec<&str> = registry
            .object("Listing")
            .unwrap()
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(fields, vec!["id", "status"]);
    }

    #[test]
    fn test_unresolved_extension() {
        let err = registry(&["extend type Ghost { id: ID }"]).unwrap_err();
        assert_eq!(err.code().code(), "SEARCH_SCHEMA_UNRESOLVED_EXTENSION");
    }

    #[test]
    fn test_duplicate_type() {
        let err = registry(&["type Listing { id: ID }", "enum Listing { A }"]).unwrap_err();
        assert_eq!(err.code().code(), "SEARCH_SCHEMA_DUPLICATE_TYPE");
    }

    #[test]
    fn test_redeclared_registered_scalar_is_allowed() {
        assert!(registry(&["scalar Long", "scalar Instant"]).is_ok());
    }

    #[test]
    fn test_objects_in_name_order() {
        let registry = registry(&["type B { x: Int } type A { y: Int }"]).unwrap();
        let names: Vec<&str> = registry.objects().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
