//! Prometheus metrics for gateway observability.
//!
//! Metrics are exposed via a dedicated HTTP listener (default port 9090,
//! configurable with `METRICS_PORT`, 0 disables).
//!
//! # Available Metrics
//!
//! ## Counters
//! - `rategate_requests_total` - Governed requests checked (label: decision)
//! - `rategate_cache_errors_total` - Cache backend failures absorbed by the
//!   fail-open policy
//!
//! ## Histograms
//! - `rategate_check_duration_seconds` - Admission check duration

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const REQUESTS_TOTAL: &str = "rategate_requests_total";
    pub const CACHE_ERRORS_TOTAL: &str = "rategate_cache_errors_total";
    pub const CHECK_DURATION_SECONDS: &str = "rategate_check_duration_seconds";
}

/// Initialize the Prometheus metrics exporter.
///
/// Sets up metric descriptions and starts the Prometheus HTTP listener on
/// the given address.
///
/// # Errors
///
/// Returns an error message if the exporter cannot be installed (e.g., the
/// port is already bound).
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::REQUESTS_TOTAL,
        "Total governed requests checked by the rate limiter, by decision"
    );
    describe_counter!(
        names::CACHE_ERRORS_TOTAL,
        "Total cache backend errors absorbed by the fail-open policy"
    );
    describe_histogram!(
        names::CHECK_DURATION_SECONDS,
        "Rate limit admission check duration in seconds"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
///
/// Metrics are optional: the gateway keeps serving without them.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

/// Record a governed request decision ("allowed" or "limited").
pub fn record_request(decision: &str) {
    counter!(names::REQUESTS_TOTAL, "decision" => decision.to_string()).increment(1);
}

/// Record a cache backend error absorbed by fail-open.
pub fn record_cache_error() {
    counter!(names::CACHE_ERRORS_TOTAL).increment(1);
}

/// Record the duration of an admission check.
pub fn record_check_duration(duration_secs: f64) {
    histogram!(names::CHECK_DURATION_SECONDS).record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    // These verify the recording functions don't panic without an installed
    // exporter; scrape-level checks belong in deployment smoke tests.

    #[test]
    fn test_record_request() {
        record_request("allowed");
        record_request("limited");
    }

    #[test]
    fn test_record_cache_error() {
        record_cache_error();
    }

    #[test]
    fn test_record_check_duration() {
        record_check_duration(0.002);
    }
}
