//! Health and readiness endpoints.
//!
//! Both live outside the governed path prefix so probes are never
//! rate-limited.
//!
//! - **Health** (`/health`): always 200, includes version and uptime
//! - **Readiness** (`/ready`): Kubernetes-compatible readiness probe

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use crate::state::AppState;

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Health check endpoint.
///
/// # Response Body
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "uptime_seconds": 3600,
///   "timestamp": "2026-01-15T10:30:00Z"
/// }
/// ```
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        timestamp: Utc::now(),
    })
}

/// Readiness check endpoint for Kubernetes probes.
///
/// The gateway has no hard external dependency - the in-memory cache is
/// always available and a degraded backend fails open - so readiness is
/// simply "the server is accepting connections".
#[instrument]
pub async fn readiness_check() -> StatusCode {
    StatusCode::OK
}
