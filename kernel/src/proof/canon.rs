//! Canonical JSON bytes: the one serialization used for hashing.
//!
//! Rules: object keys sorted by byte order, compact form, integers only.
//! `serde_json::Map` is ordered by key when the `preserve_order` feature is
//! off, so the encoder only has to reject non-integer numbers before
//! delegating to `serde_json::to_vec`.

use thiserror::Error;

/// Error type for canonical JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonError {
    /// A JSON number was not an integer (float, NaN, Infinity).
    #[error("non-integer number in canonical JSON: {raw}")]
    NonIntegerNumber { raw: String },
    /// `serde_json` refused to encode the value.
    #[error("canonical JSON encoding failed: {detail}")]
    Encode { detail: String },
}

/// Produce canonical JSON bytes from a `serde_json::Value`.
///
/// # Errors
///
/// Returns [`CanonError::NonIntegerNumber`] if any number is not representable
/// as `i64` or `u64`.
pub fn canonical_json_bytes(value: &serde_json::Value) -> Result<Vec<u8>, CanonError> {
    reject_non_integers(value)?;
    serde_json::to_vec(value).map_err(|e| CanonError::Encode {
        detail: e.to_string(),
    })
}

fn reject_non_integers(value: &serde_json::Value) -> Result<(), CanonError> {
    match value {
        serde_json::Value::Number(n) if n.as_i64().is_none() && n.as_u64().is_none() => {
            Err(CanonError::NonIntegerNumber { raw: n.to_string() })
        }
        serde_json::Value::Array(items) => items.iter().try_for_each(reject_non_integers),
        serde_json::Value::Object(map) => map.values().try_for_each(reject_non_integers),
        _ => Ok(()),
    }
}
