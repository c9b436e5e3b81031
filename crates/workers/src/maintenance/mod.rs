mod refresh;
mod retention;

pub use refresh::{RuleSource, ThresholdRefresher};
pub use retention::RetentionSweeper;
