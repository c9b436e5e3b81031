pub mod auth_layer;
pub mod rate_limit;
pub mod request_metrics;

pub use auth_layer::{require_auth, Caller};
pub use rate_limit::RateLimiter;
