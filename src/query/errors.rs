//! Query translation errors

use thiserror::Error;

/// Result type for query translation
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while interpreting filter, group-by and sort input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    // ==================
    // Client input errors
    // ==================
    /// Malformed filter expression
    #[error("Invalid filter at [{path}]: {reason}")]
    InvalidFilter { path: String, reason: String },

    /// Malformed group-by expression
    #[error("Invalid groupBy at [{path}]: {reason}")]
    InvalidGroupBy { path: String, reason: String },

    /// Malformed sort specification
    #[error("Invalid sort: {0}")]
    InvalidSort(String),

    /// Sort specification without a target
    #[error("Must specify one of: field, geoDistance, script")]
    MissingSortTarget,

    // ==================
    // Configuration errors
    // ==================
    /// Aggregation type the result decoder does not understand
    #[error("Unsupported aggregation [{0}]")]
    UnsupportedAggregation(String),
}

impl QueryError {
    pub(crate) fn filter(path: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::InvalidFilter {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn group_by(path: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::InvalidGroupBy {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True if the error was caused by client input
    pub fn is_client_error(&self) -> bool {
        !matches!(self, QueryError::UnsupportedAggregation(_))
    }
}
