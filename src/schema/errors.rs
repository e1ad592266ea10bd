//! Schema error types
//!
//! Error codes:
//! - SEARCH_SCHEMA_IO (FATAL)
//! - SEARCH_SCHEMA_SYNTAX (FATAL)
//! - SEARCH_SCHEMA_DUPLICATE_TYPE (FATAL)
//! - SEARCH_SCHEMA_UNRESOLVED_EXTENSION (FATAL)
//! - SEARCH_SCHEMA_INVALID_DIRECTIVE (FATAL)
//! - SEARCH_SCHEMA_MISSING_ID (FATAL)
//! - SEARCH_SCHEMA_UNKNOWN_DOCUMENT_TYPE (FATAL)
//! - SEARCH_SCHEMA_UNSUPPORTED_TYPE (FATAL)
//! - SEARCH_SCHEMA_INVALID_VALUE (REJECT)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client input rejected
    Reject,
    /// Schema cannot be used; configuration must be fixed
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Schema source could not be read
    SearchSchemaIo,
    /// Schema source is not valid SDL
    SearchSchemaSyntax,
    /// A type is defined twice
    SearchSchemaDuplicateType,
    /// `extend type` names a type that is never defined
    SearchSchemaUnresolvedExtension,
    /// A directive argument has the wrong shape
    SearchSchemaInvalidDirective,
    /// Document type without a reachable `@id` field
    SearchSchemaMissingId,
    /// Type name is not a document type
    SearchSchemaUnknownDocumentType,
    /// Field type has no index mapping
    SearchSchemaUnsupportedType,
    /// Input value does not coerce to its scalar type
    SearchSchemaInvalidValue,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::SearchSchemaIo => "SEARCH_SCHEMA_IO",
            SchemaErrorCode::SearchSchemaSyntax => "SEARCH_SCHEMA_SYNTAX",
            SchemaErrorCode::SearchSchemaDuplicateType => "SEARCH_SCHEMA_DUPLICATE_TYPE",
            SchemaErrorCode::SearchSchemaUnresolvedExtension => "SEARCH_SCHEMA_UNRESOLVED_EXTENSION",
            SchemaErrorCode::SearchSchemaInvalidDirective => "SEARCH_SCHEMA_INVALID_DIRECTIVE",
            SchemaErrorCode::SearchSchemaMissingId => "SEARCH_SCHEMA_MISSING_ID",
            SchemaErrorCode::SearchSchemaUnknownDocumentType => "SEARCH_SCHEMA_UNKNOWN_DOCUMENT_TYPE",
            SchemaErrorCode::SearchSchemaUnsupportedType => "SEARCH_SCHEMA_UNSUPPORTED_TYPE",
            SchemaErrorCode::SearchSchemaInvalidValue => "SEARCH_SCHEMA_INVALID_VALUE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::SearchSchemaInvalidValue => Severity::Reject,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Type name if applicable
    type_name: Option<String>,
    /// Source file if applicable
    source_file: Option<String>,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, message: String, type_name: Option<String>) -> Self {
        Self {
            code,
            message,
            type_name,
            source_file: None,
        }
    }

    /// Create an I/O error for a schema source
    pub fn io(path: impl Into<String>, reason: impl fmt::Display) -> Self {
        let path = path.into();
        Self {
            code: SchemaErrorCode::SearchSchemaIo,
            message: format!("Cannot read schema source '{}': {}", path, reason),
            type_name: None,
            source_file: Some(path),
        }
    }

    /// Create a syntax error at a line/column position
    pub fn syntax(line: usize, column: usize, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::SearchSchemaSyntax,
            format!("Syntax error at {}:{}: {}", line, column, reason.into()),
            None,
        )
    }

    /// Create a duplicate type error
    pub fn duplicate_type(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            SchemaErrorCode::SearchSchemaDuplicateType,
            format!("Type [{}] is defined more than once", name),
            Some(name),
        )
    }

    /// Create an unresolved extension error
    pub fn unresolved_extension(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            SchemaErrorCode::SearchSchemaUnresolvedExtension,
            format!("Cannot extend undefined type [{}]", name),
            Some(name),
        )
    }

    /// Create an invalid directive argument error
    pub fn invalid_directive(
        type_name: impl Into<String>,
        field: &str,
        reason: impl Into<String>,
    ) -> Self {
        let type_name = type_name.into();
        Self::new(
            SchemaErrorCode::SearchSchemaInvalidDirective,
            format!("Invalid directive on {}.{}: {}", type_name, field, reason.into()),
            Some(type_name),
        )
    }

    /// Create a missing identifier field error
    pub fn missing_id(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self::new(
            SchemaErrorCode::SearchSchemaMissingId,
            format!(
                "Document type {} does not have a field annotated with @id",
                type_name
            ),
            Some(type_name),
        )
    }

    /// Create an unknown document type error
    pub fn unknown_document_type(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self::new(
            SchemaErrorCode::SearchSchemaUnknownDocumentType,
            format!("Unknown document type [{}]", type_name),
            Some(type_name),
        )
    }

    /// Create an unsupported field type error
    pub fn unsupported_type(type_name: impl Into<String>, field: &str, field_type: &str) -> Self {
        let type_name = type_name.into();
        Self::new(
            SchemaErrorCode::SearchSchemaUnsupportedType,
            format!(
                "Unsupported type {} for field {}.{}",
                field_type, type_name, field
            ),
            Some(type_name),
        )
    }

    /// Create an invalid scalar value error
    pub fn invalid_value(scalar: impl Into<String>, reason: impl Into<String>) -> Self {
        let scalar = scalar.into();
        Self::new(
            SchemaErrorCode::SearchSchemaInvalidValue,
            format!("Invalid {} value: {}", scalar, reason.into()),
            Some(scalar),
        )
    }

    /// Attach the source file this error was raised for
    pub fn in_file(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if self.source_file.is_none() {
            self.message = format!("{}: {}", path, self.message);
            self.source_file = Some(path);
        }
        self
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the type name if applicable
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Returns the source file if applicable
    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
