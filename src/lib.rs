//! Fetch Cache - An in-process fetch-or-compute cache
//!
//! Memoizes the result of a computation under a logical key plus optional
//! parameters, with per-entry TTL expiration checked lazily on read.
//!
//! ```ignore
//! let cache = FetchCache::new();
//! let user: User = cache
//!     .fetch(FetchRequest::new("user").params(&id).ttl_secs(60), || load_user(id))
//!     .await?;
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheStats, FetchCache, FetchRequest, NoParams};
pub use config::Config;
pub use error::{CacheError, Result};
