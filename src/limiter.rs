//! Fixed-window rate limiter core.
//!
//! Counts requests per client key in discrete, non-overlapping 60-second
//! buckets. The counter record lives only in the injected cache and expires
//! on its own; the limiter never deletes entries.
//!
//! # Algorithm
//!
//! For each governed request:
//!
//! - cache miss: start a fresh window at `now` with a count of 1;
//! - hit inside the window, at or over the limit: reject with a retry hint
//!   and leave the stored counter untouched;
//! - hit inside the window, under the limit: increment the counter;
//! - hit with the window elapsed: reset to a fresh window (fixed-window
//!   reset, not sliding or leaky-bucket).
//!
//! Every allowed outcome writes the record back with a refreshed TTL of one
//! window length.
//!
//! # Failure policy
//!
//! The limiter fails open: a cache backend error on read or write logs a
//! warning, increments `rategate_cache_errors_total`, and admits the
//! request. A broken cache degrades accuracy, never availability.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::CacheBackend;
use crate::metrics;

/// Fixed window length in seconds.
pub const WINDOW_SECS: i64 = 60;

/// Cache entry TTL, equal to the window length. An idle client's record
/// self-expires one window after its last allowed request.
const WINDOW_TTL: Duration = Duration::from_secs(WINDOW_SECS as u64);

/// Per-client counter record stored in the cache.
///
/// Ephemeral by design: created lazily on a client's first request,
/// overwritten wholesale on every allowed request, and expired by the store
/// itself once the TTL lapses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindowState {
    /// Requests observed within the current window, always >= 1.
    pub request_count: u32,
    /// When the current window began.
    pub window_start: DateTime<Utc>,
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Request admitted; `request_count` is the observed count in the
    /// current window after this request.
    Allowed { request_count: u32 },
    /// Request rejected; the client should retry after `retry_after_secs`.
    Limited { retry_after_secs: u64 },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// Build the cache key for a client.
pub fn cache_key(client_key: &str) -> String {
    format!("rate_limit:{client_key}")
}

/// Fixed-window admission controller over an injected expiring cache.
pub struct RateLimiter {
    cache: Arc<dyn CacheBackend>,
    limit_per_minute: u32,
}

impl RateLimiter {
    /// Create a limiter with the given per-minute budget.
    ///
    /// `limit_per_minute` is expected to be validated (> 0) by configuration
    /// loading before it reaches here.
    pub fn new(cache: Arc<dyn CacheBackend>, limit_per_minute: u32) -> Self {
        Self {
            cache,
            limit_per_minute,
        }
    }

    pub fn limit_per_minute(&self) -> u32 {
        self.limit_per_minute
    }

    /// Run the fixed-window check for `client_key` at time `now`.
    ///
    /// `now` is supplied by the caller so window rollover is testable
    /// without sleeping; the middleware passes `Utc::now()`.
    ///
    /// The read, the arithmetic, and the write-back are three separate steps
    /// with no compare-and-swap: two concurrent requests from one client may
    /// both observe the same count and under-count true load. Accepted -
    /// the limiter is best-effort, not exact.
    pub async fn check(&self, client_key: &str, now: DateTime<Utc>) -> Decision {
        let key = cache_key(client_key);

        let cached = match self.cache.get(&key).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %e, client_key = %client_key, "cache read failed, admitting request");
                metrics::record_cache_error();
                return Decision::Allowed { request_count: 1 };
            }
        };

        let state = match cached {
            Some(prev) => {
                let elapsed_secs = now.signed_duration_since(prev.window_start).num_seconds();
                if elapsed_secs < WINDOW_SECS {
                    if prev.request_count >= self.limit_per_minute {
                        // Rejection leaves the stored counter untouched: the
                        // observed count stays at the limit until the window
                        // rolls over, and the entry's TTL is not refreshed.
                        let retry_after_secs = (WINDOW_SECS - elapsed_secs).max(0) as u64;
                        return Decision::Limited { retry_after_secs };
                    }
                    RateWindowState {
                        request_count: prev.request_count + 1,
                        window_start: prev.window_start,
                    }
                } else {
                    // Window elapsed: fixed-window reset.
                    RateWindowState {
                        request_count: 1,
                        window_start: now,
                    }
                }
            }
            None => RateWindowState {
                request_count: 1,
                window_start: now,
            },
        };

        let request_count = state.request_count;
        if let Err(e) = self.cache.set(&key, state, WINDOW_TTL).await {
            warn!(error = %e, client_key = %client_key, "cache write failed, admitting request");
            metrics::record_cache_error();
        }

        Decision::Allowed { request_count }
    }
}
