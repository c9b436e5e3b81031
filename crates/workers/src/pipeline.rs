use std::sync::Arc;
use std::time::Instant;

use fleetwatch_common::alert::Alert;
use fleetwatch_common::ledger::{AlertLedger, LedgerError, RaiseOutcome};
use fleetwatch_common::retry::RetryConfig;
use fleetwatch_common::sample::TelemetrySample;

use crate::alert::{Evaluator, Verdict};
use crate::metrics::worker_metrics::WorkerMetrics;
use crate::notifier::{AlertNotification, Notifier};
use crate::storage::{write_with_retry, SampleStore, WriteError};

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    NoRule,
    Normal,
    Created(Alert),
    Suppressed { existing_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestError {
    Storage(WriteError),
    Ledger(LedgerError),
}

impl IngestError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Ledger(LedgerError::Unavailable(_)) => true,
            Self::Ledger(_) => false,
        }
    }
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "telemetry write: {e}"),
            Self::Ledger(e) => write!(f, "alert ledger: {e}"),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<WriteError> for IngestError {
    fn from(e: WriteError) -> Self {
        Self::Storage(e)
    }
}

impl From<LedgerError> for IngestError {
    fn from(e: LedgerError) -> Self {
        Self::Ledger(e)
    }
}

// A rejected write does not skip evaluation; an unreachable store fails the message.
pub struct IngestPipeline {
    evaluator: Evaluator,
    ledger: Arc<dyn AlertLedger>,
    writer: Option<Arc<dyn SampleStore>>,
    write_retry: RetryConfig,
    notifier: Option<Arc<dyn Notifier>>,
    metrics: Arc<WorkerMetrics>,
}

impl IngestPipeline {
    pub fn new(evaluator: Evaluator, ledger: Arc<dyn AlertLedger>, metrics: Arc<WorkerMetrics>) -> Self {
        Self {
            evaluator,
            ledger,
            writer: None,
            write_retry: RetryConfig::default(),
            notifier: None,
            metrics,
        }
    }

    pub fn with_writer(mut self, writer: impl SampleStore + 'static) -> Self {
        self.writer = Some(Arc::new(writer));
        self
    }

    pub fn with_write_retry(mut self, retry: RetryConfig) -> Self {
        self.write_retry = retry;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub async fn process_message(
        &self,
        samples: &[TelemetrySample],
    ) -> Result<Vec<IngestOutcome>, IngestError> {
        let start = Instant::now();
        let result = self.process_inner(samples).await;
        self.metrics.record_processing_latency(start);
        if result.is_err() {
            self.metrics.inc_ingest_errors();
        }
        result
    }

    async fn process_inner(&self, samples: &[TelemetrySample]) -> Result<Vec<IngestOutcome>, IngestError> {
        if let Some(writer) = &self.writer {
            let db_start = Instant::now();
            match write_with_retry(writer.as_ref(), samples, &self.write_retry).await {
                Ok(written) => {
                    self.metrics.record_db_latency(db_start);
                    self.metrics.add_rows_written(written);
                }
                Err(e) if !e.is_transient() => {
                    self.metrics.inc_write_failures();
                    tracing::error!(
                        error = %e,
                        samples = samples.len(),
                        "telemetry write rejected, evaluating without storing"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        let mut outcomes = Vec::with_capacity(samples.len());
        for sample in samples {
            outcomes.push(self.evaluate(sample).await?);
            self.metrics.inc_samples_processed();
        }
        Ok(outcomes)
    }

    pub async fn evaluate(&self, sample: &TelemetrySample) -> Result<IngestOutcome, IngestError> {
        let candidate = match self.evaluator.evaluate(sample) {
            Verdict::NoRule => return Ok(IngestOutcome::NoRule),
            Verdict::Normal => return Ok(IngestOutcome::Normal),
            Verdict::Breach(candidate) => candidate,
        };

        match self.ledger.raise(candidate).await? {
            RaiseOutcome::Created(alert) => {
                tracing::info!(
                    alert_id = %alert.id,
                    source_id = %sample.source_id,
                    metric_type = %sample.metric_type,
                    severity = %alert.severity,
                    value = alert.triggering_value,
                    threshold = alert.threshold_value,
                    "alert created"
                );
                self.metrics.inc_alerts_created();
                self.notify(&alert);
                Ok(IngestOutcome::Created(alert))
            }
            RaiseOutcome::Suppressed { existing_id } => {
                tracing::debug!(
                    existing_id = %existing_id,
                    source_id = %sample.source_id,
                    metric_type = %sample.metric_type,
                    "breach suppressed by unresolved alert"
                );
                self.metrics.inc_alerts_suppressed();
                Ok(IngestOutcome::Suppressed { existing_id })
            }
        }
    }

    fn notify(&self, alert: &Alert) {
        let Some(notifier) = self.notifier.clone() else {
            return;
        };
        let metrics = self.metrics.clone();
        let notification = AlertNotification::created(alert.clone());
        tokio::spawn(async move {
            match notifier.send(&notification).await {
                Ok(()) => metrics.inc_notifications_sent(),
                Err(e) => {
                    metrics.inc_notifications_failed();
                    tracing::error!(
                        alert_id = %notification.alert.id,
                        channel = notifier.name(),
                        error = %e,
                        "alert notification failed"
                    );
                }
            }
        });
    }
}
