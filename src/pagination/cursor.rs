//! Keyset cursor codec
//!
//! A cursor holds the sort values of one hit, one per sort clause in clause
//! order. It is encoded as URL-safe base64 of a small versioned JSON object
//! `{"v": 1, "k": [...]}`, so a cursor can be built directly from known sort
//! values as well as read back from a page.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{PaginationError, PaginationResult};

/// Current cursor encoding version
pub const CURSOR_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Encoded {
    v: u32,
    k: Vec<Value>,
}

/// Keyset position: the sort values of one hit
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    keys: Vec<Value>,
}

impl Cursor {
    pub fn new(keys: Vec<Value>) -> Self {
        Self { keys }
    }

    /// Sort values, one per sort clause
    pub fn keys(&self) -> &[Value] {
        &self.keys
    }

    pub fn into_keys(self) -> Vec<Value> {
        self.keys
    }

    pub fn encode(&self) -> String {
        let encoded = serde_json::json!({"v": CURSOR_VERSION, "k": self.keys});
        URL_SAFE_NO_PAD.encode(encoded.to_string())
    }

    pub fn decode(cursor: &str) -> PaginationResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(cursor.trim())
            .map_err(|e| PaginationError::InvalidCursor(e.to_string()))?;
        let encoded: Encoded = serde_json::from_slice(&bytes)
            .map_err(|e| PaginationError::InvalidCursor(e.to_string()))?;

        if encoded.v != CURSOR_VERSION {
            return Err(PaginationError::InvalidCursor(format!(
                "unsupported cursor version {}",
                encoded.v
            )));
        }
        Ok(Self { keys: encoded.k })
    }

    /// Decode a cursor that must carry exactly one key per sort clause
    pub fn decode_for(cursor: &str, sort_clauses: usize) -> PaginationResult<Self> {
        let decoded = Self::decode(cursor)?;
        if decoded.keys.len() != sort_clauses {
            return Err(PaginationError::InvalidCursor(format!(
                "expected {} sort key(s), got {}",
                sort_clauses,
                decoded.keys.len()
            )));
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_constructed_cursor() {
        let text = URL_SAFE_NO_PAD.encode(r#"{"v":1,"k":[2,"urn:listing:7"]}"#);
        let cursor = Cursor::decode(&text).unwrap();
        assert_eq!(cursor.keys(), &[json!(2), json!("urn:listing:7")]);
        assert_eq!(cursor.encode(), text);
    }

    #[test]
    fn test_mixed_key_types_survive() {
        let cursor = Cursor::new(vec![json!(1.0), json!(null), json!(true), json!("a")]);
        assert_eq!(Cursor::decode(&cursor.encode()).unwrap(), cursor);
    }

    #[test]
    fn test_malformed_cursors() {
        let texts = vec![
            "!!!".to_string(),
            String::new(),
            URL_SAFE_NO_PAD.encode("[1,2]"),
            URL_SAFE_NO_PAD.encode(r#"{"v":2,"k":[]}"#),
        ];
        for text in &texts {
            assert!(
                matches!(Cursor::decode(text), Err(PaginationError::InvalidCursor(_))),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_key_count_must_match_sort() {
        let text = Cursor::new(vec![json!(1)]).encode();
        assert!(Cursor::decode_for(&text, 1).is_ok());
        assert!(matches!(
            Cursor::decode_for(&text, 2),
            Err(PaginationError::InvalidCursor(_))
        ));
    }
}
