//! Pagination cursor encoding.
//!
//! A cursor is the base64 encoding of a JSON page-boundary object.
//! Decoding happens only when cursor paging is active and a cursor
//! string is present; a malformed cursor surfaces as a distinct error
//! kind instead of failing unpredictably downstream.

use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;

/// Errors raised while encoding or decoding a pagination cursor.
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    #[error("invalid cursor encoding: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("invalid cursor payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Encodes a page-boundary object into an opaque cursor string.
pub fn encode_cursor(boundary: &Value) -> Result<String, CursorError> {
    let bytes = serde_json::to_vec(boundary)?;
    Ok(general_purpose::STANDARD.encode(bytes))
}

/// Decodes an opaque cursor string back into its page-boundary object.
pub fn decode_cursor(cursor: &str) -> Result<Value, CursorError> {
    let bytes = general_purpose::STANDARD.decode(cursor)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cursor_round_trip() {
        let boundary = json!({"id": "b42", "title": "Dune"});
        let cursor = encode_cursor(&boundary).unwrap();
        assert_eq!(decode_cursor(&cursor).unwrap(), boundary);
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert!(matches!(
            decode_cursor("not!!base64"),
            Err(CursorError::Encoding(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_payload() {
        let cursor = general_purpose::STANDARD.encode(b"not json at all");
        assert!(matches!(
            decode_cursor(&cursor),
            Err(CursorError::Payload(_))
        ));
    }
}
