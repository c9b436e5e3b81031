mod error;
pub mod loader;
mod repo;
mod rule;
mod store;

pub use error::ThresholdError;
pub use repo::PgThresholdRepo;
pub use rule::{RuleKey, Scope, ThresholdDraft, ThresholdPatch, ThresholdRule};
pub use store::ThresholdStore;
