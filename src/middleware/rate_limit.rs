//! Rate limiting middleware enforcing the fixed-window counter.
//!
//! The layer sits ahead of route dispatch. On every request it:
//!
//! 1. passes paths outside the governed prefix through untouched (no cache
//!    traffic, no logging);
//! 2. derives the client key from the network address;
//! 3. runs the fixed-window check against the shared cache;
//! 4. forwards admitted requests, or short-circuits with
//!    `429 {"error": "Rate limit exceeded", "retry_after": <secs>}` plus a
//!    `Retry-After` header - the inner service is never called on reject.
//!
//! The prefix check is a pure prefix test, not a route match: any path
//! sharing the prefix is governed, unknown sub-paths included.

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::Json;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Serialize;
use tower::{Layer, Service};
use tracing::{info, warn};

use crate::limiter::{Decision, RateLimiter};
use crate::metrics;

use super::ip::extract_client_ip;

/// Rejection body matching the gateway's response contract.
#[derive(Debug, Serialize)]
struct RateLimitExceeded {
    error: &'static str,
    retry_after: u64,
}

/// Rate limiting layer for the Tower middleware stack.
///
/// # Example
///
/// ```rust,ignore
/// let layer = RateLimitLayer::new(limiter, "/api/");
/// let app = Router::new()
///     .route("/api/ping", get(handler))
///     .layer(layer);
/// ```
#[derive(Clone)]
pub struct RateLimitLayer {
    limiter: Arc<RateLimiter>,
    governed_prefix: Arc<str>,
}

impl RateLimitLayer {
    /// Create a layer governing every path under `governed_prefix`.
    pub fn new(limiter: Arc<RateLimiter>, governed_prefix: &str) -> Self {
        Self {
            limiter,
            governed_prefix: Arc::from(governed_prefix),
        }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            limiter: self.limiter.clone(),
            governed_prefix: self.governed_prefix.clone(),
        }
    }
}

/// Rate limiting service wrapper.
#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    limiter: Arc<RateLimiter>,
    governed_prefix: Arc<str>,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();

        // Ungoverned paths bypass the limiter entirely.
        if !req.uri().path().starts_with(self.governed_prefix.as_ref()) {
            return Box::pin(async move { inner.call(req).await });
        }

        let limiter = self.limiter.clone();
        let path = req.uri().path().to_owned();
        let client_key = extract_client_ip(&req).into_owned();

        Box::pin(async move {
            // Logged before the decision is made, once per governed request.
            info!(client_key = %client_key, path = %path, "rate limit check for governed request");

            let started = Instant::now();
            let decision = limiter.check(&client_key, Utc::now()).await;
            metrics::record_check_duration(started.elapsed().as_secs_f64());

            match decision {
                Decision::Allowed { .. } => {
                    metrics::record_request("allowed");
                    inner.call(req).await
                }
                Decision::Limited { retry_after_secs } => {
                    metrics::record_request("limited");
                    warn!(
                        client_key = %client_key,
                        path = %path,
                        retry_after_secs,
                        "rate limit exceeded"
                    );

                    let response = (
                        StatusCode::TOO_MANY_REQUESTS,
                        [("Retry-After", retry_after_secs.to_string())],
                        Json(RateLimitExceeded {
                            error: "Rate limit exceeded",
                            retry_after: retry_after_secs,
                        }),
                    )
                        .into_response();

                    Ok(response)
                }
            }
        })
    }
}
