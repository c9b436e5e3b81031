mod filter;
mod record;
mod stats;

pub use filter::{AlertFilter, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
pub use record::{Alert, AlertKey, AlertState, NewAlert};
pub use stats::AlertStats;
