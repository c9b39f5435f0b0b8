//! Error types for the fetch cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by the cache itself.
///
/// Failures of the caller's computation are never wrapped in this type; they
/// are returned to the caller as-is.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Logical key was empty
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Parameters could not be serialized into a derived key
    #[error("Key derivation failed: {0}")]
    KeyDerivation(#[from] serde_json::Error),

    /// Derived key is not valid base64 or not valid UTF-8 once decoded
    #[error("Malformed derived key: {0}")]
    MalformedKey(String),

    /// A fresh entry exists but holds a different value type
    #[error("Type mismatch for key '{key}': expected {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
