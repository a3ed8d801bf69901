use thiserror::Error;

/// Application-wide error types.
///
/// The rate limiter itself never surfaces errors to clients: every admission
/// check resolves to either pass-through or a 429 short-circuit, and cache
/// backend failures are absorbed by the fail-open policy. These variants
/// cover the paths that do propagate - configuration loading and cache
/// backend plumbing.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cache backend error: {0}")]
    Cache(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
