use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use fleetwatch_common::threshold::{PgThresholdRepo, ThresholdError, ThresholdRule, ThresholdStore};

use crate::metrics::worker_metrics::WorkerMetrics;

#[async_trait]
pub trait RuleSource: Send + Sync {
    async fn load_all(&self) -> Result<Vec<ThresholdRule>, ThresholdError>;
}

#[async_trait]
impl RuleSource for PgThresholdRepo {
    async fn load_all(&self) -> Result<Vec<ThresholdRule>, ThresholdError> {
        PgThresholdRepo::load_all(self).await
    }
}

pub struct ThresholdRefresher {
    pub source: Arc<dyn RuleSource>,
    pub store: ThresholdStore,
    pub interval: Duration,
    pub metrics: Arc<WorkerMetrics>,
}

impl ThresholdRefresher {
    pub async fn refresh_once(&self) -> Result<usize, ThresholdError> {
        let rules = self.source.load_all().await?;
        let count = rules.len();
        self.store.replace_all(rules);
        self.metrics.inc_threshold_refreshes();
        Ok(count)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(self.interval).await;
                match self.refresh_once().await {
                    Ok(count) => tracing::debug!(rules = count, "threshold rules refreshed"),
                    Err(e) => {
                        self.metrics.inc_threshold_refresh_errors();
                        tracing::warn!(error = %e, "threshold refresh failed, keeping previous rules");
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetwatch_common::threshold::Scope;
    use std::sync::Mutex;

    struct StaticSource(Mutex<Result<Vec<ThresholdRule>, ThresholdError>>);

    #[async_trait]
    impl RuleSource for StaticSource {
        async fn load_all(&self) -> Result<Vec<ThresholdRule>, ThresholdError> {
            self.0.lock().unwrap().clone()
        }
    }

    fn rule(id: &str, warning: f64) -> ThresholdRule {
        ThresholdRule {
            id: id.into(),
            metric_type: "temperature".into(),
            scope: Scope::Global,
            warning_value: warning,
            critical_value: warning + 10.0,
            enabled: true,
            created_at_ms: 0,
            updated_at_ms: 0,
        }
    }

    #[tokio::test]
    async fn refresh_replaces_store_contents() {
        let store = ThresholdStore::with_rules(vec![rule("old", 50.0)]).unwrap();
        let refresher = ThresholdRefresher {
            source: Arc::new(StaticSource(Mutex::new(Ok(vec![rule("new", 70.0)])))),
            store: store.clone(),
            interval: Duration::from_secs(30),
            metrics: WorkerMetrics::new(),
        };

        assert_eq!(refresher.refresh_once().await.unwrap(), 1);
        assert!(store.get("old").is_none());
        assert_eq!(store.resolve("temperature", "robot-1").unwrap().id, "new");
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_rules() {
        let store = ThresholdStore::with_rules(vec![rule("old", 50.0)]).unwrap();
        let refresher = ThresholdRefresher {
            source: Arc::new(StaticSource(Mutex::new(Err(ThresholdError::Unavailable(
                "db down".into(),
            ))))),
            store: store.clone(),
            interval: Duration::from_secs(30),
            metrics: WorkerMetrics::new(),
        };

        assert!(refresher.refresh_once().await.is_err());
        assert_eq!(store.count(), 1);
    }
}
