//! Search engine client errors

use serde_json::{json, Map, Value};
use thiserror::Error;

/// Result type for search engine calls
pub type EngineResult<T> = Result<T, EngineError>;

/// Root cause reason that hides the real failure in the shard details
const RUNTIME_ERROR_REASON: &str = "runtime error";

/// Errors reported by the search engine or its client
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Index or alias does not exist
    #[error("no such index [{0}]")]
    IndexNotFound(String),

    /// Index already exists
    #[error("index [{0}] already exists")]
    IndexAlreadyExists(String),

    /// Request the engine cannot execute
    #[error("Unsupported request: {0}")]
    Unsupported(String),

    /// Error response from the engine, with its raw body when there is one
    #[error("Search engine returned status {status}: {message}")]
    Response {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// Client-side failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn response(status: u16, message: impl Into<String>, body: Option<Value>) -> Self {
        EngineError::Response {
            status,
            message: message.into(),
            body,
        }
    }

    /// HTTP-style status of the failure
    pub fn status(&self) -> u16 {
        match self {
            EngineError::IndexNotFound(_) => 404,
            EngineError::IndexAlreadyExists(_) | EngineError::Unsupported(_) => 400,
            EngineError::Response { status, .. } => *status,
            EngineError::Internal(_) => 500,
        }
    }

    /// Best-effort human readable reason.
    ///
    /// Reads `error.root_cause[0].reason` from the response body; when that is
    /// the generic runtime error, reads the script failure from
    /// `error.failed_shards[0].reason.caused_by.reason`. Falls back to the
    /// error's own message when the body has neither.
    pub fn reason(&self) -> String {
        let EngineError::Response { message, body, .. } = self else {
            return self.to_string();
        };

        body.as_ref()
            .and_then(extract_reason)
            .unwrap_or_else(|| message.clone())
    }

    /// Diagnostic metadata for error reporting
    pub fn metadata(&self) -> Map<String, Value> {
        let mut metadata = Map::new();
        metadata.insert("status".into(), json!(self.status()));

        match self {
            EngineError::IndexNotFound(index) | EngineError::IndexAlreadyExists(index) => {
                metadata.insert("index".into(), json!(index));
            }
            EngineError::Response { body: Some(body), .. } => {
                if let Some(error_type) = body.pointer("/error/type").and_then(Value::as_str) {
                    metadata.insert("type".into(), json!(error_type));
                }
                if let Some(index) = body.pointer("/error/index").and_then(Value::as_str) {
                    metadata.insert("index".into(), json!(index));
                }
            }
            _ => {}
        }
        metadata
    }
}

fn extract_reason(body: &Value) -> Option<String> {
    let reason = body.pointer("/error/root_cause/0/reason")?.as_str()?;
    if reason != RUNTIME_ERROR_REASON {
        return Some(reason.to_string());
    }

    let caused_by = body
        .pointer("/error/failed_shards/0/reason/caused_by/reason")
        .and_then(Value::as_str)
        .unwrap_or(reason);
    Some(caused_by.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_from_root_cause() {
        let err = EngineError::response(
            400,
            "search_phase_execution_exception",
            Some(json!({"error": {
                "type": "search_phase_execution_exception",
                "root_cause": [{"reason": "failed to parse date field [x]"}],
            }})),
        );
        assert_eq!(err.reason(), "failed to parse date field [x]");
        assert_eq!(err.metadata()["type"], json!("search_phase_execution_exception"));
        assert_eq!(err.metadata()["status"], json!(400));
    }

    #[test]
    fn test_reason_from_script_failure() {
        let err = EngineError::response(
            400,
            "script failed",
            Some(json!({"error": {
                "root_cause": [{"reason": "runtime error"}],
                "failed_shards": [{"reason": {"caused_by": {"reason": "divide by zero"}}}],
            }})),
        );
        assert_eq!(err.reason(), "divide by zero");
    }

    #[test]
    fn test_reason_never_panics_on_odd_bodies() {
        for body in [
            json!(null),
            json!("text"),
            json!({"error": "plain"}),
            json!({"error": {"root_cause": []}}),
            json!({"error": {"root_cause": [{"reason": 7}]}}),
            json!({"error": {"root_cause": [{"reason": "runtime error"}], "failed_shards": 3}}),
        ] {
            let err = EngineError::response(500, "boom", Some(body));
            let reason = err.reason();
            assert!(reason == "boom" || reason == "runtime error", "{}", reason);
        }

        assert_eq!(EngineError::response(502, "bad gateway", None).reason(), "bad gateway");
        assert_eq!(
            EngineError::IndexNotFound("listing".into()).reason(),
            "no such index [listing]"
        );
    }
}
