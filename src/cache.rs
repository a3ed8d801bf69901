//! Expiring key-value cache for rate window state.
//!
//! The limiter never talks to a concrete store: it receives a
//! [`CacheBackend`] at construction. The trait matches the minimal contract
//! the limiter needs - `get` a record or miss, `set` a record with a TTL the
//! store itself honors. A distributed deployment can swap in a Redis-backed
//! implementation without touching the limiter.
//!
//! [`MemoryCache`] is the default in-process implementation. Expired entries
//! are never visible to `get`; a periodic [`MemoryCache::purge_expired`]
//! sweep reclaims their memory.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::limiter::RateWindowState;

/// Key-value store contract for rate window records.
///
/// Implementations must be shareable across all concurrent requests. No
/// atomicity beyond whole-record overwrite is required: the limiter's
/// read-modify-write sequence is deliberately best-effort (lost updates
/// under concurrency are accepted).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch the record stored under `key`, or `None` on miss/expiry.
    async fn get(&self, key: &str) -> AppResult<Option<RateWindowState>>;

    /// Store `state` under `key`, replacing any previous record. The entry
    /// must become invisible once `ttl` elapses.
    async fn set(&self, key: &str, state: RateWindowState, ttl: Duration) -> AppResult<()>;
}

struct Entry {
    state: RateWindowState,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process [`CacheBackend`] backed by a `HashMap` with per-entry expiry.
///
/// The lock protects map integrity only; it makes no attempt to serialize
/// the limiter's read-increment-write sequence.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every expired entry, returning how many were evicted.
    ///
    /// Correctness never depends on this running: `get` already treats
    /// expired entries as misses. Called periodically to bound memory held
    /// for clients that stopped sending requests.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of live (possibly expired but unswept) entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<RateWindowState>> {
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.state.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // The entry was present but expired; evict it so the map does not
        // grow while waiting for the next sweep. Re-check under the write
        // lock - a concurrent `set` may have refreshed it.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.is_expired(now) {
                entries.remove(key);
            } else {
                return Ok(Some(entry.state.clone()));
            }
        }
        Ok(None)
    }

    async fn set(&self, key: &str, state: RateWindowState, ttl: Duration) -> AppResult<()> {
        let entry = Entry {
            state,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }
}
