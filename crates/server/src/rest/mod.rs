mod alerts;
pub mod error;
mod health;
mod metrics;
mod router;
mod thresholds;

pub use error::ApiError;
pub use router::{router, AppState};
