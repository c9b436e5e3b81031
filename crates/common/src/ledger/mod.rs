mod error;
mod memory;
mod postgres;

pub use error::LedgerError;
pub use memory::MemoryLedger;
pub use postgres::PgLedger;

use async_trait::async_trait;

use crate::alert::{Alert, AlertFilter, AlertStats, NewAlert};

#[derive(Debug, Clone, PartialEq)]
pub enum RaiseOutcome {
    Created(Alert),
    Suppressed { existing_id: String },
}

#[async_trait]
pub trait AlertLedger: Send + Sync {
    async fn create(&self, alert: NewAlert) -> Result<Alert, LedgerError>;

    // Check and insert are atomic per source and metric.
    async fn raise(&self, alert: NewAlert) -> Result<RaiseOutcome, LedgerError>;

    async fn get(&self, id: &str) -> Result<Alert, LedgerError>;

    async fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, LedgerError>;

    async fn acknowledge(&self, id: &str, actor: &str, now_ms: i64) -> Result<Alert, LedgerError>;

    async fn resolve(&self, id: &str, now_ms: i64) -> Result<Alert, LedgerError>;

    async fn delete(&self, id: &str) -> Result<(), LedgerError>;

    async fn stats(&self, since_ms: Option<i64>) -> Result<AlertStats, LedgerError>;

    async fn purge_resolved_before(&self, cutoff_ms: i64) -> Result<u64, LedgerError>;

    async fn ping(&self) -> Result<(), LedgerError>;
}

fn validate_actor(actor: &str) -> Result<&str, LedgerError> {
    let actor = actor.trim();
    if actor.is_empty() {
        return Err(LedgerError::InvalidInput("acknowledging actor must not be empty".into()));
    }
    Ok(actor)
}
