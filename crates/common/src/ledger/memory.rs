use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::{validate_actor, AlertLedger, LedgerError, RaiseOutcome};
use crate::alert::{Alert, AlertFilter, AlertKey, AlertStats, NewAlert};

#[derive(Clone, Default)]
pub struct MemoryLedger {
    alerts: Arc<DashMap<String, Alert>>,
    open: Arc<DashMap<AlertKey, Vec<String>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.alerts.len()
    }

    fn is_open(&self, id: &str) -> bool {
        self.alerts.get(id).is_some_and(|a| !a.resolved)
    }

    // `raise` locks `open` before `alerts`; never call this holding an alerts guard.
    fn forget_open(&self, key: &AlertKey, id: &str) {
        if let Some(mut ids) = self.open.get_mut(key) {
            ids.retain(|open_id| open_id != id);
        }
        self.open.remove_if(key, |_, ids| ids.is_empty());
    }

    #[cfg(test)]
    fn open_index_len(&self) -> usize {
        self.open.iter().map(|ids| ids.len()).sum()
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[async_trait]
impl AlertLedger for MemoryLedger {
    async fn create(&self, alert: NewAlert) -> Result<Alert, LedgerError> {
        alert.validate()?;
        let mut open = self.open.entry(alert.key()).or_default();
        let stored = alert.into_alert(new_id());
        open.push(stored.id.clone());
        self.alerts.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn raise(&self, alert: NewAlert) -> Result<RaiseOutcome, LedgerError> {
        alert.validate()?;
        let mut open = self.open.entry(alert.key()).or_default();
        open.retain(|id| self.is_open(id));

        let covering = open.iter().find(|id| {
            self.alerts
                .get(id.as_str())
                .is_some_and(|a| a.severity >= alert.severity)
        });
        if let Some(existing_id) = covering {
            return Ok(RaiseOutcome::Suppressed {
                existing_id: existing_id.clone(),
            });
        }

        let stored = alert.into_alert(new_id());
        open.push(stored.id.clone());
        self.alerts.insert(stored.id.clone(), stored.clone());
        Ok(RaiseOutcome::Created(stored))
    }

    async fn get(&self, id: &str) -> Result<Alert, LedgerError> {
        self.alerts
            .get(id)
            .map(|a| a.clone())
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))
    }

    async fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, LedgerError> {
        let mut matched: Vec<Alert> = self
            .alerts
            .iter()
            .filter(|a| filter.matches(a.value()))
            .map(|a| a.value().clone())
            .collect();
        matched.sort_by(|a, b| {
            b.created_at_ms
                .cmp(&a.created_at_ms)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(matched
            .into_iter()
            .skip(filter.offset)
            .take(filter.effective_limit())
            .collect())
    }

    async fn acknowledge(&self, id: &str, actor: &str, now_ms: i64) -> Result<Alert, LedgerError> {
        let actor = validate_actor(actor)?;
        let mut entry = self
            .alerts
            .get_mut(id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        entry.acknowledge(actor, now_ms)?;
        Ok(entry.clone())
    }

    async fn resolve(&self, id: &str, now_ms: i64) -> Result<Alert, LedgerError> {
        let resolved = {
            let mut entry = self
                .alerts
                .get_mut(id)
                .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
            entry.resolve(now_ms);
            entry.clone()
        };
        self.forget_open(&resolved.key(), id);
        Ok(resolved)
    }

    async fn delete(&self, id: &str) -> Result<(), LedgerError> {
        let (_, removed) = self
            .alerts
            .remove(id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        self.forget_open(&removed.key(), id);
        Ok(())
    }

    async fn stats(&self, since_ms: Option<i64>) -> Result<AlertStats, LedgerError> {
        let mut stats = AlertStats::default();
        for entry in self.alerts.iter() {
            if since_ms.is_some_and(|t| entry.created_at_ms < t) {
                continue;
            }
            stats.record(entry.value());
        }
        Ok(stats)
    }

    async fn purge_resolved_before(&self, cutoff_ms: i64) -> Result<u64, LedgerError> {
        let mut purged = Vec::new();
        self.alerts.retain(|id, a| {
            let expired = a.resolved_at_ms.is_some_and(|t| t < cutoff_ms);
            if expired {
                purged.push((a.key(), id.clone()));
            }
            !expired
        });
        for (key, id) in &purged {
            self.forget_open(key, id);
        }
        Ok(purged.len() as u64)
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        Ok(())
    }
}
