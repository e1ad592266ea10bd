//! Service error taxonomy
//!
//! Every failure of an inbound operation is one of:
//! - `Configuration`: schema or setup problem (INTERNAL)
//! - `Validation`: client input rejected (VALIDATION)
//! - `BulkFailure`: some documents of a put were not written (INTERNAL)
//! - `Engine`: the search engine reported an error (INTERNAL)

use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::pagination::PaginationError;
use crate::query::QueryError;
use crate::schema::SchemaError;

/// Result type for inbound operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Classification a caller reports errors under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Internal,
    Validation,
}

/// One document that failed to be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkFailure {
    pub id: String,
    pub index: String,
    pub reason: String,
}

/// One reportable error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEntry {
    pub message: String,
    pub kind: ErrorKind,
    pub extensions: Map<String, Value>,
}

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Validation(String),

    #[error("Bulk response has {} failure(s)", .0.len())]
    BulkFailure(Vec<BulkFailure>),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::Configuration(_) | ServiceError::BulkFailure(_) | ServiceError::Engine(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Render as reportable entries: one per failed item for bulk failures,
    /// one otherwise.
    pub fn to_error_entries(&self) -> Vec<ErrorEntry> {
        match self {
            ServiceError::BulkFailure(failures) => failures
                .iter()
                .map(|failure| {
                    let mut extensions = Map::new();
                    extensions.insert("id".into(), json!(failure.id));
                    extensions.insert("index".into(), json!(failure.index));
                    ErrorEntry {
                        message: failure.reason.clone(),
                        kind: ErrorKind::Internal,
                        extensions,
                    }
                })
                .collect(),
            ServiceError::Engine(e) => vec![ErrorEntry {
                message: e.reason(),
                kind: ErrorKind::Internal,
                extensions: e.metadata(),
            }],
            other => vec![ErrorEntry {
                message: other.to_string(),
                kind: other.kind(),
                extensions: Map::new(),
            }],
        }
    }
}

impl From<SchemaError> for ServiceError {
    fn from(e: SchemaError) -> Self {
        if e.is_fatal() {
            ServiceError::Configuration(e.to_string())
        } else {
            ServiceError::Validation(e.message().to_string())
        }
    }
}

impl From<QueryError> for ServiceError {
    fn from(e: QueryError) -> Self {
        if e.is_client_error() {
            ServiceError::Validation(e.to_string())
        } else {
            ServiceError::Configuration(e.to_string())
        }
    }
}

impl From<PaginationError> for ServiceError {
    fn from(e: PaginationError) -> Self {
        match e {
            PaginationError::Schema(e) => e.into(),
            PaginationError::Query(e) => e.into(),
            e if e.is_client_error() => ServiceError::Validation(e.to_string()),
            e => ServiceError::Configuration(e.to_string()),
        }
    }
}

impl From<ConfigError> for ServiceError {
    fn from(e: ConfigError) -> Self {
        ServiceError::Configuration(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(
            ServiceError::from(QueryError::MissingSortTarget).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ServiceError::from(PaginationError::InvalidCursor("bad".into())).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ServiceError::from(PaginationError::PageSizeExceeded {
                requested: 3000,
                maximum: 2000
            })
            .to_string(),
            "first value 3000 exceeds maximum 2000"
        );
        assert_eq!(
            ServiceError::from(SchemaError::missing_id("Listing")).kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            ServiceError::from(SchemaError::invalid_value("Long", "cannot coerce \"x\"")).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ServiceError::from(EngineError::IndexNotFound("listing".into())).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_bulk_failure_entries() {
        let err = ServiceError::BulkFailure(vec![
            BulkFailure {
                id: "1".into(),
                index: "listing_v1".into(),
                reason: "failed to parse field [bedrooms]".into(),
            },
            BulkFailure {
                id: "3".into(),
                index: "listing_v1".into(),
                reason: "failed to parse field [location]".into(),
            },
        ]);

        let entries = err.to_error_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].message, "failed to parse field [location]");
        assert_eq!(entries[1].extensions["id"], json!("3"));
        assert_eq!(entries[1].extensions["index"], json!("listing_v1"));
        assert_eq!(
            serde_json::to_value(&entries[0]).unwrap()["kind"],
            json!("INTERNAL")
        );
    }

    #[test]
    fn test_engine_error_entry_carries_metadata() {
        let err = ServiceError::from(EngineError::response(
            400,
            "search_phase_execution_exception",
            Some(json!({"error": {
                "type": "search_phase_execution_exception",
                "root_cause": [{"reason": "No mapping found for [rating]"}],
            }})),
        ));

        let entries = err.to_error_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "No mapping found for [rating]");
        assert_eq!(entries[0].extensions["status"], json!(400));
        assert_eq!(entries[0].extensions["type"], json!("search_phase_execution_exception"));
    }

    #[test]
    fn test_validation_entry() {
        let entries = ServiceError::Validation("Missing document ID field [key.urn]".into()).to_error_entries();
        assert_eq!(entries[0].kind, ErrorKind::Validation);
        assert!(entries[0].extensions.is_empty());
    }
}
