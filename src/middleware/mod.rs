//! HTTP middleware for admission control.
//!
//! ```text
//! Request → Rate Limiter → Trace → Handler → Response
//!               ↓
//!           429 Too Many Requests (governed prefix only)
//! ```
//!
//! The rate limiter runs before route dispatch; everything outside the
//! governed path prefix passes through untouched.

pub mod ip;
pub mod rate_limit;

pub use ip::{UNKNOWN_IP, extract_client_ip};
pub use rate_limit::RateLimitLayer;
