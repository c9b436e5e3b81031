use fleetwatch_common::retry::{retry_async, RetryConfig};
use fleetwatch_common::sample::TelemetrySample;

use super::writer::SampleStore;

#[derive(Debug, Clone, PartialEq)]
pub enum WriteError {
    Connection(String),
    Sql(String),
}

impl WriteError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Sql(msg) => {
                msg.contains("connection")
                    || msg.contains("timeout")
                    || msg.contains("too many clients")
                    || msg.contains("deadlock")
            }
        }
    }
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "connection: {e}"),
            Self::Sql(e) => write!(f, "sql: {e}"),
        }
    }
}

impl std::error::Error for WriteError {}

impl From<sqlx::Error> for WriteError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => Self::Connection(e.to_string()),
            other => Self::Sql(other.to_string()),
        }
    }
}

pub async fn write_with_retry(
    store: &dyn SampleStore,
    samples: &[TelemetrySample],
    retry: &RetryConfig,
) -> Result<u64, WriteError> {
    retry_async(retry, "telemetry_write", WriteError::is_transient, || {
        store.insert_batch(samples)
    })
    .await
}
