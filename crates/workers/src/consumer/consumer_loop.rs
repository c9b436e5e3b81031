use async_nats::jetstream::consumer::PullConsumer;
use async_nats::jetstream::AckKind;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use fleetwatch_common::clock::now_ms;
use fleetwatch_common::sample::TelemetrySample;

use super::handler::{decode_message, pull_batch};
use crate::metrics::worker_metrics::WorkerMetrics;
use crate::pipeline::IngestError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const REDELIVERY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ack,
    Redeliver,
}

pub fn disposition(result: &Result<(), IngestError>) -> Disposition {
    match result {
        Err(e) if e.is_retryable() => Disposition::Redeliver,
        _ => Disposition::Ack,
    }
}

pub struct ConsumerLoop {
    consumer: PullConsumer,
    batch_size: usize,
    metrics: Arc<WorkerMetrics>,
}

impl ConsumerLoop {
    pub fn new(consumer: PullConsumer, batch_size: usize, metrics: Arc<WorkerMetrics>) -> Self {
        Self {
            consumer,
            batch_size,
            metrics,
        }
    }

    pub async fn run<F, Fut>(&self, on_samples: F) -> Result<(), BoxError>
    where
        F: Fn(Vec<TelemetrySample>) -> Fut,
        Fut: Future<Output = Result<(), IngestError>>,
    {
        loop {
            let messages = pull_batch(&self.consumer, self.batch_size).await?;

            if messages.is_empty() {
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }

            for msg in messages {
                let samples = match decode_message(&msg, now_ms()) {
                    Ok(samples) => samples,
                    Err(e) => {
                        self.metrics.inc_decode_errors();
                        tracing::warn!(subject = %msg.subject, error = %e, "decode failed, acking to discard");
                        if let Err(ae) = msg.ack().await {
                            tracing::error!(error = %ae, "ack failed");
                        }
                        continue;
                    }
                };

                let result = on_samples(samples).await;
                match disposition(&result) {
                    Disposition::Ack => {
                        if let Err(e) = &result {
                            tracing::error!(subject = %msg.subject, error = %e, "ingest failed permanently, discarding");
                        }
                        match msg.ack().await {
                            Ok(()) => self.metrics.inc_messages_acked(),
                            Err(e) => tracing::error!(error = %e, "ack failed"),
                        }
                    }
                    Disposition::Redeliver => {
                        if let Err(e) = &result {
                            tracing::warn!(subject = %msg.subject, error = %e, "ingest failed, requesting redelivery");
                        }
                        match msg.ack_with(AckKind::Nak(Some(REDELIVERY_DELAY))).await {
                            Ok(()) => self.metrics.inc_messages_nacked(),
                            Err(e) => tracing::error!(error = %e, "nak failed"),
                        }
                    }
                }
            }
        }
    }
}
