use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use fleetwatch_common::clock::now_ms;
use fleetwatch_common::ledger::{AlertLedger, LedgerError};

use crate::metrics::worker_metrics::WorkerMetrics;

pub struct RetentionSweeper {
    pub ledger: Arc<dyn AlertLedger>,
    pub retention: Duration,
    pub interval: Duration,
    pub metrics: Arc<WorkerMetrics>,
}

impl RetentionSweeper {
    pub fn cutoff_ms(&self, now_ms: i64) -> i64 {
        let retention_ms = i64::try_from(self.retention.as_millis()).unwrap_or(i64::MAX);
        now_ms.saturating_sub(retention_ms)
    }

    pub async fn sweep_once(&self, now_ms: i64) -> Result<u64, LedgerError> {
        let purged = self.ledger.purge_resolved_before(self.cutoff_ms(now_ms)).await?;
        self.metrics.add_alerts_purged(purged);
        if purged > 0 {
            tracing::info!(purged, "retention sweep removed resolved alerts");
        }
        Ok(purged)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(self.interval).await;
                if let Err(e) = self.sweep_once(now_ms()).await {
                    tracing::warn!(error = %e, "retention sweep failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetwatch_common::alert::NewAlert;
    use fleetwatch_common::ledger::MemoryLedger;
    use fleetwatch_common::Severity;

    const DAY_MS: i64 = 86_400_000;

    fn alert(source: &str) -> NewAlert {
        NewAlert {
            source_id: Some(source.into()),
            metric_type: "temperature".into(),
            severity: Severity::Warning,
            triggering_value: 65.0,
            threshold_value: 60.0,
            rule_id: None,
            message: String::new(),
            created_at_ms: 0,
        }
    }

    #[tokio::test]
    async fn sweeps_only_expired_resolved_alerts() {
        let ledger = Arc::new(MemoryLedger::new());
        let old = ledger.create(alert("a")).await.unwrap();
        ledger.resolve(&old.id, DAY_MS).await.unwrap();
        let fresh = ledger.create(alert("b")).await.unwrap();
        ledger.resolve(&fresh.id, 40 * DAY_MS).await.unwrap();
        let open = ledger.create(alert("c")).await.unwrap();

        let metrics = WorkerMetrics::new();
        let sweeper = RetentionSweeper {
            ledger: ledger.clone(),
            retention: Duration::from_secs(30 * 86_400),
            interval: Duration::from_secs(3600),
            metrics: metrics.clone(),
        };

        assert_eq!(sweeper.sweep_once(45 * DAY_MS).await.unwrap(), 1);
        assert!(ledger.get(&old.id).await.is_err());
        assert!(ledger.get(&fresh.id).await.is_ok());
        assert!(ledger.get(&open.id).await.is_ok());
        assert_eq!(metrics.alerts_purged_val(), 1);
    }

    #[test]
    fn cutoff_never_underflows() {
        let sweeper = RetentionSweeper {
            ledger: Arc::new(MemoryLedger::new()),
            retention: Duration::from_secs(30 * 86_400),
            interval: Duration::from_secs(1),
            metrics: WorkerMetrics::new(),
        };
        assert_eq!(sweeper.cutoff_ms(45 * DAY_MS), 15 * DAY_MS);
        assert_eq!(sweeper.cutoff_ms(i64::MIN + 1), i64::MIN);
    }

    #[test]
    fn huge_retention_keeps_everything() {
        let sweeper = RetentionSweeper {
            ledger: Arc::new(MemoryLedger::new()),
            retention: Duration::from_secs(u64::MAX),
            interval: Duration::from_secs(1),
            metrics: WorkerMetrics::new(),
        };
        assert!(sweeper.cutoff_ms(45 * DAY_MS) < 0);
    }
}
