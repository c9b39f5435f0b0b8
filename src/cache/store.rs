//! Fetch Cache Module
//!
//! Main cache engine: derived-key lookup, lazy TTL expiration and
//! populate-on-miss.

use std::any::type_name;
use std::collections::HashMap;
use std::future::{self, Future};
use std::sync::{Arc, Mutex as TableMutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, FetchRequest};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Cache State ==
/// Everything guarded by the state lock.
#[derive(Debug, Default)]
struct CacheState {
    /// Derived key to entry
    entries: HashMap<String, CacheEntry>,
    /// Fetch outcome counters
    stats: CacheStats,
}

// == Key Lock Slot ==
/// Per-key locks for fetches in progress.
type KeyLockTable = TableMutex<HashMap<String, Arc<Mutex<()>>>>;

/// A claim on one key's lock slot.
///
/// Dropping it removes the slot from the table once no other fetch holds it,
/// including when the fetch future is cancelled or its callback panics.
struct KeyLockSlot<'a> {
    table: &'a KeyLockTable,
    derived: &'a str,
    slot: Arc<Mutex<()>>,
}

impl<'a> KeyLockSlot<'a> {
    fn acquire(table: &'a KeyLockTable, derived: &'a str) -> Self {
        let slot = table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(derived.to_string())
            .or_default()
            .clone();

        Self {
            table,
            derived,
            slot,
        }
    }

    async fn lock(&self) -> MutexGuard<'_, ()> {
        self.slot.lock().await
    }
}

impl Drop for KeyLockSlot<'_> {
    fn drop(&mut self) {
        let mut locks = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // Table and this claim are the only holders: nobody is waiting on this key
        if Arc::strong_count(&self.slot) == 2 {
            locks.remove(self.derived);
        }
    }
}

// == Fetch Cache ==
/// Memoizes computations by logical key and parameters.
///
/// Safe to share between tasks (wrap it in an `Arc`). The check, compute and
/// store steps of a fetch are serialized per derived key, so concurrent
/// fetches of one key run the callback at most once per miss while fetches of
/// other keys proceed independently.
#[derive(Debug)]
pub struct FetchCache {
    /// Entries and statistics
    state: RwLock<CacheState>,
    /// One async mutex per derived key with a fetch in progress
    key_locks: KeyLockTable,
    /// TTL used when a request does not set one
    default_ttl: Duration,
}

impl FetchCache {
    // == Constructor ==
    /// Creates an empty cache with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Creates an empty cache from configuration.
    pub fn with_config(config: &Config) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            key_locks: TableMutex::new(HashMap::new()),
            default_ttl: Duration::from_secs(config.default_ttl),
        }
    }

    // == Fetch ==
    /// Returns the cached value for `request`, computing it on a miss.
    ///
    /// On a hit the stored value is returned and `callback` is dropped without
    /// being called. On a miss (no entry, or an expired one) `callback` runs
    /// exactly once; a successful result is stored with the request's TTL and
    /// returned. A failed result is returned unchanged and nothing is stored,
    /// so the next fetch tries again.
    ///
    /// # Errors
    /// - The callback's own error
    /// - `CacheError::InvalidKey` / `CacheError::KeyDerivation` if the key
    ///   cannot be derived
    /// - `CacheError::TypeMismatch` if a fresh entry holds another type
    pub async fn fetch<T, P, F, Fut, E>(
        &self,
        request: FetchRequest<'_, P>,
        callback: F,
    ) -> std::result::Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        P: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<CacheError>,
    {
        let derived = request.derived_key()?;
        let ttl = request.ttl_override().unwrap_or(self.default_ttl);

        let slot = KeyLockSlot::acquire(&self.key_locks, &derived);
        let _permit = slot.lock().await;
        self.fetch_locked(request.key(), &derived, ttl, callback)
            .await
    }

    /// Same as [`fetch`](Self::fetch) for a callback that completes
    /// synchronously.
    pub async fn fetch_sync<T, P, F, E>(
        &self,
        request: FetchRequest<'_, P>,
        callback: F,
    ) -> std::result::Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        P: Serialize + ?Sized,
        F: FnOnce() -> std::result::Result<T, E>,
        E: From<CacheError>,
    {
        self.fetch(request, || future::ready(callback())).await
    }

    /// Check, compute and store. Caller holds the key lock.
    async fn fetch_locked<T, F, Fut, E>(
        &self,
        key: &str,
        derived: &str,
        ttl: Duration,
        callback: F,
    ) -> std::result::Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<CacheError>,
    {
        if let Some(value) = self.lookup::<T>(key, derived).await? {
            return Ok(value);
        }

        match callback().await {
            Ok(value) => {
                self.store(derived, value.clone(), ttl).await;
                debug!(key, ttl_secs = ttl.as_secs(), "Stored computed value");
                Ok(value)
            }
            Err(err) => {
                self.state.write().await.stats.record_failure();
                warn!(key, "Callback failed, nothing cached");
                Err(err)
            }
        }
    }

    // == Lookup ==
    /// Returns the value of a fresh entry, or `None` on a miss.
    async fn lookup<T>(&self, key: &str, derived: &str) -> Result<Option<T>>
    where
        T: Clone + 'static,
    {
        let mut state = self.state.write().await;

        let fresh = state
            .entries
            .get(derived)
            .filter(|entry| !entry.is_expired())
            .map(|entry| (entry.value::<T>(), entry.type_name()));

        match fresh {
            Some((Some(value), _)) => {
                state.stats.record_hit();
                debug!(key, "Cache hit");
                Ok(Some(value))
            }
            Some((None, stored)) => {
                warn!(key, stored, expected = type_name::<T>(), "Cached type mismatch");
                Err(CacheError::TypeMismatch {
                    key: key.to_string(),
                    expected: type_name::<T>(),
                })
            }
            None => {
                state.stats.record_miss();
                debug!(key, "Cache miss");
                Ok(None)
            }
        }
    }

    // == Store ==
    /// Writes an entry, replacing whatever was stored under `derived`.
    async fn store<T>(&self, derived: &str, value: T, ttl: Duration)
    where
        T: Send + Sync + 'static,
    {
        let mut state = self.state.write().await;
        state
            .entries
            .insert(derived.to_string(), CacheEntry::new(value, ttl));
        let count = state.entries.len();
        state.stats.set_total_entries(count);
    }

    // == Clear ==
    /// Discards every entry. Statistics counters are kept.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        let removed = state.entries.len();
        state.entries.clear();
        state.stats.set_total_entries(0);
        info!(removed, "Cache cleared");
    }

    // == Size ==
    /// Number of stored entries, including expired ones not yet replaced.
    pub async fn size(&self) -> usize {
        self.state.read().await.entries.len()
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.read().await;
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    /// TTL applied when a request does not set one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

impl Default for FetchCache {
    fn default() -> Self {
        Self::new()
    }
}
