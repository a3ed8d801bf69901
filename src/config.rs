//! Application configuration loaded from environment variables.
//!
//! All configuration is loaded from environment variables with sensible
//! defaults for development. In production, configure via environment
//! variables or a `.env` file.
//!
//! # Rate Limiting Configuration
//!
//! - `RATE_LIMIT_PER_MINUTE`: Allowed requests per minute per client
//!   (default: 60). When the variable is unset the hardcoded default applies;
//!   an explicit `0` is rejected at startup rather than silently disabling
//!   the limiter.
//! - `GOVERNED_PATH_PREFIX`: URL path root under which requests are subject
//!   to rate limiting (default: `/api/`). This is a pure prefix test, not a
//!   route match - every path sharing the prefix is governed.

use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Application configuration loaded from environment variables.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.server_addr());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 3000)
    pub port: u16,

    // =========================================================================
    // Rate Limiting Configuration
    // =========================================================================
    /// Allowed requests per minute per client key (default: 60)
    pub limit_per_minute: u32,

    /// Path prefix under which requests are rate limited (default: "/api/")
    pub governed_path_prefix: String,

    /// Interval for the background sweep that evicts expired rate window
    /// entries from the in-memory cache (default: 120 seconds). The sweep is
    /// memory hygiene only; expired entries are never visible to reads.
    pub cache_sweep_interval: Duration,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Log level (e.g., "info", "debug", "trace")
    pub log_level: String,

    /// Port for Prometheus metrics endpoint (default: 9090, 0 = disabled)
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if any configuration value is invalid
    /// (e.g., non-numeric PORT, a zero rate limit, a prefix without a
    /// leading slash).
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            // Server
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_env("PORT", 3000)?,

            // Rate limiting
            limit_per_minute: Self::parse_env("RATE_LIMIT_PER_MINUTE", 60)?,
            governed_path_prefix: env::var("GOVERNED_PATH_PREFIX")
                .unwrap_or_else(|_| "/api/".to_string()),
            cache_sweep_interval: Duration::from_secs(Self::parse_env(
                "CACHE_SWEEP_INTERVAL_SECS",
                120,
            )?),

            // Observability
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            metrics_port: Self::parse_env("METRICS_PORT", 9090)?,
        };

        // Validate configuration before returning
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if validation fails.
    fn validate(&self) -> AppResult<()> {
        if self.limit_per_minute == 0 {
            return Err(AppError::Config(
                "RATE_LIMIT_PER_MINUTE must be greater than 0".to_string(),
            ));
        }

        // The prefix must name at least one path segment; a bare "/" would
        // govern every route including the health surface.
        if !self.governed_path_prefix.starts_with('/') || self.governed_path_prefix.len() < 2 {
            return Err(AppError::Config(format!(
                "GOVERNED_PATH_PREFIX must start with '/' and name a path segment, got {:?}",
                self.governed_path_prefix
            )));
        }

        if self.cache_sweep_interval.is_zero() {
            return Err(AppError::Config(
                "CACHE_SWEEP_INTERVAL_SECS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address.
    ///
    /// Returns `None` if metrics are disabled (port = 0).
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        if self.metrics_enabled() {
            Some(std::net::SocketAddr::from((
                [0, 0, 0, 0],
                self.metrics_port,
            )))
        } else {
            None
        }
    }

    /// Parse an environment variable into the specified type with a default value.
    fn parse_env<T>(name: &str, default: T) -> AppResult<T>
    where
        T: std::str::FromStr + ToString,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(val) => val
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid {name}: {e}"))),
            Err(_) => Ok(default),
        }
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::from_env()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            limit_per_minute: 60,
            governed_path_prefix: "/api/".to_string(),
            cache_sweep_interval: Duration::from_secs(120),
            log_level: "info".to_string(),
            metrics_port: 9090,
        }
    }
}
