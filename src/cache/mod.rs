//! Cache Module
//!
//! Fetch-or-compute caching with parameterized keys and TTL expiration.

mod entry;
mod key;
mod request;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use key::{decode_key, derive_key, NoParams};
pub use request::FetchRequest;
pub use stats::CacheStats;
pub use store::FetchCache;
