//! Proto schema subsystem
//!
//! Parses the declarative type definitions, holds them in a type registry and
//! resolves the `@document`, `@id` and `@searchable` annotations into a plain
//! [`ProtoSchema`] consumed by every generator and translator.
//!
//! # Design Principles
//!
//! - Parsed and resolved once per schema version
//! - Immutable after construction, shared read-only
//! - Deterministic iteration order over types
//! - Configuration failures are FATAL

mod directives;
mod errors;
mod lexer;
mod loader;
mod parser;
mod proto;
mod registry;
pub mod scalars;
mod types;

pub use directives::{
    DirectiveResolver, FieldAnnotations, ResolvedDirectives, Searchable, DOCUMENT_DIRECTIVE,
    ID_DIRECTIVE, NESTED_FORMAT, SEARCHABLE_DIRECTIVE,
};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use loader::{SchemaLoader, SCHEMA_EXTENSION};
pub use parser::parse_document;
pub use proto::{prelude_registry, ProtoSchema, PRELUDE};
pub use registry::{TypeKind, TypeRegistry};
pub use scalars::GEO_POINT;
pub use types::{
    find_directive, ConstValue, Definition, Directive, DirectiveDefinition, Document,
    EnumTypeDefinition, EnumValueDefinition, FieldDefinition, InputObjectTypeDefinition,
    InputValueDefinition, ObjectTypeDefinition, ScalarTypeDefinition, TypeRef,
};
