//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A single computed value plus the metadata needed to judge its freshness.
///
/// The value is type-erased so that one cache can hold different value types
/// under different keys.
#[derive(Clone)]
pub struct CacheEntry {
    /// The stored value
    value: Arc<dyn Any + Send + Sync>,
    /// Name of the stored type, for diagnostics
    type_name: &'static str,
    /// When the entry was written
    written_at: Instant,
    /// TTL supplied at write time
    expires_in: Duration,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry written now.
    ///
    /// # Arguments
    /// * `value` - The computed value
    /// * `expires_in` - How long the entry stays fresh
    pub fn new<T>(value: T, expires_in: Duration) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self::with_write_time(value, expires_in, Instant::now())
    }

    /// Creates an entry with an explicit write time.
    pub fn with_write_time<T>(value: T, expires_in: Duration, written_at: Instant) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
            written_at,
            expires_in,
        }
    }

    // == Expires At ==
    /// Instant from which the entry is considered expired.
    ///
    /// Saturates to `None` when the TTL is too large to represent, meaning
    /// the entry never expires in practice.
    pub fn expires_at(&self) -> Option<Instant> {
        self.written_at.checked_add(self.expires_in)
    }

    // == Is Expired ==
    /// Checks whether the entry is expired at `now`.
    ///
    /// Fresh while `now < written_at + expires_in`. A zero TTL is therefore
    /// expired as soon as it is read.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at() {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Checks whether the entry is expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Write Metadata ==
    /// When the entry was written.
    pub fn written_at(&self) -> Instant {
        self.written_at
    }

    /// TTL the entry was written with.
    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    // == Value Access ==
    /// Returns a clone of the value if it is stored as `T`.
    pub fn value<T>(&self) -> Option<T>
    where
        T: Clone + 'static,
    {
        self.value.downcast_ref::<T>().cloned()
    }

    /// Name of the type the entry was written with.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("type_name", &self.type_name)
            .field("written_at", &self.written_at)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}
