//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (applied in order)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │  Rate Limiting   │ ← 429 if over budget (governed prefix only)
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← HTTP request/response logging
//! └────────┬─────────┘
//!          │
//!          ▼
//!      Handler
//! ```
//!
//! # Route Groups
//!
//! - `/health`, `/ready` - probes, outside the governed prefix
//! - `<GOVERNED_PATH_PREFIX>ping` - governed API

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;
use crate::middleware::RateLimitLayer;
use crate::state::AppState;

/// Build the application router with all routes and middleware configured.
///
/// The governed API is nested under `config.governed_path_prefix`, and the
/// rate limit layer governs that same prefix - the two always agree. The
/// layer runs before route dispatch, so unknown paths under the prefix are
/// governed too.
pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    let api = Router::new().route("/ping", get(handlers::ping));

    // "/api/" nests at "/api"; axum rejects nest paths with a trailing slash.
    let nest_at = config.governed_path_prefix.trim_end_matches('/').to_string();

    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .nest(&nest_at, api);

    router = router.layer(TraceLayer::new_for_http());

    info!(
        limit_per_minute = config.limit_per_minute,
        prefix = %config.governed_path_prefix,
        "Rate limiting enabled"
    );
    router = router.layer(RateLimitLayer::new(
        state.limiter.clone(),
        &config.governed_path_prefix,
    ));

    router.with_state(state)
}
