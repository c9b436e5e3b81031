use async_trait::async_trait;
use sqlx::PgPool;

use fleetwatch_common::sample::TelemetrySample;

use super::retry::WriteError;

#[async_trait]
pub trait SampleStore: Send + Sync {
    async fn insert_batch(&self, samples: &[TelemetrySample]) -> Result<u64, WriteError>;
}

#[derive(Clone)]
pub struct SampleWriter {
    pool: PgPool,
}

impl SampleWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SampleStore for SampleWriter {
    async fn insert_batch(&self, samples: &[TelemetrySample]) -> Result<u64, WriteError> {
        if samples.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for sample in samples {
            let result = sqlx::query(
                r#"INSERT INTO telemetry (time, source_id, metric_type, value)
                   VALUES (to_timestamp($1::double precision / 1000), $2, $3, $4)
                   ON CONFLICT DO NOTHING"#,
            )
            .bind(sample.timestamp_ms)
            .bind(&sample.source_id)
            .bind(&sample.metric_type)
            .bind(sample.value)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }
}
