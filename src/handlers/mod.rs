pub mod api;
pub mod health;

pub use api::ping;
pub use health::{health_check, readiness_check};
