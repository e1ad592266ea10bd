//! Pagination errors

use thiserror::Error;

use crate::query::QueryError;
use crate::schema::SchemaError;

/// Result type for pagination
pub type PaginationResult<T> = Result<T, PaginationError>;

/// Errors raised while planning a page or decoding its results
#[derive(Debug, Clone, Error)]
pub enum PaginationError {
    // ==================
    // Client input errors
    // ==================
    /// Requested page size over the configured maximum
    #[error("first value {requested} exceeds maximum {maximum}")]
    PageSizeExceeded { requested: usize, maximum: usize },

    /// Cursor does not decode to the expected keyset shape
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// Page request arguments of the wrong shape
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Filter, group-by or sort translation failed
    #[error(transparent)]
    Query(#[from] QueryError),

    // ==================
    // Configuration errors
    // ==================
    /// Document type or identifier could not be resolved
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl PaginationError {
    /// True if the error was caused by client input
    pub fn is_client_error(&self) -> bool {
        match self {
            PaginationError::PageSizeExceeded { .. }
            | PaginationError::InvalidCursor(_)
            | PaginationError::InvalidRequest(_) => true,
            PaginationError::Query(e) => e.is_client_error(),
            PaginationError::Schema(e) => !e.is_fatal(),
        }
    }
}
