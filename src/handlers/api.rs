//! Governed API endpoints.
//!
//! The gateway's job is admission control, not the API behind it; `/ping`
//! stands in for the protected backend. Every route mounted under the
//! governed prefix - including paths that 404 - passes through the rate
//! limiter first.

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

/// Ping response body.
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Representative governed endpoint.
///
/// Reaching this handler means the request was admitted by the rate
/// limiter.
#[instrument]
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
