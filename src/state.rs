//! Shared application state for Axum handlers.
//!
//! The state is cloned per request handler; everything inside is `Arc`
//! wrapped. Background tasks are managed with `tokio_util::task::TaskTracker`
//! and a `CancellationToken` - call [`AppState::shutdown`] before exit to
//! stop them cleanly.
//!
//! The single background task here is the cache sweep: it periodically
//! evicts expired rate window entries from the in-memory cache. The limiter
//! never depends on it (expired entries already read as misses); it only
//! bounds memory held for clients that went quiet.

use std::sync::Arc;
use std::time::Instant;

use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::cache::MemoryCache;
use crate::config::Config;
use crate::limiter::RateLimiter;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// The admission controller shared by the middleware
    pub limiter: Arc<RateLimiter>,
    /// Timestamp when the application started
    pub started_at: Instant,
    /// Tracks spawned background tasks for graceful shutdown
    task_tracker: TaskTracker,
    /// Cancellation token for signaling background tasks to stop
    cancellation_token: CancellationToken,
}

impl AppState {
    /// Create application state around the given cache.
    ///
    /// Spawns the cache sweep task at `config.cache_sweep_interval`. Call
    /// [`AppState::shutdown`] to terminate it gracefully.
    pub fn new(config: Config, cache: Arc<MemoryCache>) -> Self {
        let config = Arc::new(config);
        let limiter = Arc::new(RateLimiter::new(cache.clone(), config.limit_per_minute));

        let state = Self {
            config,
            limiter,
            started_at: Instant::now(),
            task_tracker: TaskTracker::new(),
            cancellation_token: CancellationToken::new(),
        };

        state.spawn_cache_sweep_task(cache);

        state
    }

    /// Spawn the background cache sweep task.
    fn spawn_cache_sweep_task(&self, cache: Arc<MemoryCache>) {
        let sweep_interval = self.config.cache_sweep_interval;
        let cancel = self.cancellation_token.clone();

        self.task_tracker.spawn(async move {
            let mut ticker = interval(sweep_interval);
            ticker.tick().await; // Skip the first immediate tick

            loop {
                tokio::select! {
                    biased; // Check cancellation first

                    _ = cancel.cancelled() => {
                        debug!("Cache sweep task received cancellation signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        let removed = cache.purge_expired().await;
                        if removed > 0 {
                            debug!(removed, "Evicted expired rate window entries");
                        }
                    }
                }
            }

            debug!("Cache sweep task shutting down");
        });
    }

    /// Gracefully shut down all background tasks.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown of background tasks");

        self.cancellation_token.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;

        info!("All background tasks have completed");
    }

    /// Get the application uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_builds_limiter_from_config() {
        let config = Config {
            limit_per_minute: 7,
            ..Config::default()
        };
        let state = AppState::new(config, Arc::new(MemoryCache::new()));

        assert_eq!(state.limiter.limit_per_minute(), 7);
        state.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_completes() {
        let state = AppState::new(Config::default(), Arc::new(MemoryCache::new()));

        // Must return promptly even with the sweep task mid-interval.
        state.shutdown().await;
    }
}
