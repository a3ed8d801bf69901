//! # Rategate
//!
//! A fixed-window, per-client rate limiting gateway built on Axum, featuring:
//!
//! - **Admission control**: fixed-window counter per client address, enforced
//!   as Tower middleware ahead of route dispatch
//! - **Injected storage**: the counter state lives behind a `get`/`set`-with-TTL
//!   cache trait, so the in-memory store can be swapped for a shared one
//! - **Fail-open resilience**: a broken cache backend degrades accuracy, never
//!   availability
//! - **Observability**: structured logging, Prometheus metrics, health endpoints
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Rate Limit → Trace)                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (health, governed API)                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RateLimiter (fixed-window counter)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CacheBackend (MemoryCache, TTL-expiring)                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rategate::{AppState, Config, MemoryCache, build_router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rategate::AppError> {
//!     let config = Config::from_env()?;
//!     let cache = Arc::new(MemoryCache::new());
//!     let state = AppState::new(config, cache);
//!     let _app = build_router(state);
//!
//!     // Serve `_app` with axum::serve...
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```bash
//! RATE_LIMIT_PER_MINUTE=60 GOVERNED_PATH_PREFIX=/api/ cargo run
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use cache::{CacheBackend, MemoryCache};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use limiter::{Decision, RateLimiter, RateWindowState};
pub use middleware::RateLimitLayer;
pub use routes::build_router;
pub use state::AppState;
