//! Key Derivation Module
//!
//! Turns a logical key plus optional parameters into the string the cache
//! stores entries under.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;

use crate::error::{CacheError, Result};

// == Key Material ==
/// Record that gets serialized and encoded into a derived key.
///
/// `params` is omitted entirely when absent, so "no parameters" and an empty
/// parameter object produce different keys.
#[derive(Serialize)]
struct KeyMaterial<'a, P: ?Sized> {
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<&'a P>,
}

// == No Params Marker ==
/// Marker for a fetch without parameters.
///
/// Never serialized; it only fills the parameter type slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoParams;

// == Derive Key ==
/// Derives the composite lookup key for `(key, params)`.
///
/// The record is serialized to JSON and base64-encoded. The encoding is
/// lossless, so two inputs share a derived key only if they serialize to the
/// same JSON text. Parameters whose serialization depends on ordering (for
/// example a `HashMap`) only hit when they serialize identically.
///
/// # Errors
/// - `InvalidKey` if `key` is empty
/// - `KeyDerivation` if `params` cannot be serialized
pub fn derive_key<P>(key: &str, params: Option<&P>) -> Result<String>
where
    P: Serialize + ?Sized,
{
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key must not be empty".to_string()));
    }

    let material = KeyMaterial { key, params };
    let json = serde_json::to_string(&material)?;
    Ok(STANDARD.encode(json.as_bytes()))
}

// == Decode Key ==
/// Recovers the serialized record from a derived key.
pub fn decode_key(derived: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(derived)
        .map_err(|e| CacheError::MalformedKey(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CacheError::MalformedKey(e.to_string()))
}
