use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;
use crate::sample::validate_metric_type;
use crate::severity::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    Open,
    Acknowledged,
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub source_id: Option<String>,
    pub metric_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub source_id: Option<String>,
    pub metric_type: String,
    pub severity: Severity,
    pub triggering_value: f64,
    pub threshold_value: f64,
    pub rule_id: Option<String>,
    pub message: String,
    pub acknowledged: bool,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at_ms: Option<i64>,
    pub resolved: bool,
    pub resolved_at_ms: Option<i64>,
    pub created_at_ms: i64,
}

impl Alert {
    pub fn state(&self) -> AlertState {
        if self.resolved {
            AlertState::Resolved
        } else if self.acknowledged {
            AlertState::Acknowledged
        } else {
            AlertState::Open
        }
    }

    pub fn key(&self) -> AlertKey {
        AlertKey {
            source_id: self.source_id.clone(),
            metric_type: self.metric_type.clone(),
        }
    }

    pub fn acknowledge(&mut self, actor: &str, now_ms: i64) -> Result<(), LedgerError> {
        match self.state() {
            AlertState::Resolved => Err(LedgerError::AlreadyResolved(self.id.clone())),
            AlertState::Acknowledged => Err(LedgerError::AlreadyAcknowledged(self.id.clone())),
            AlertState::Open => {
                self.acknowledged = true;
                self.acknowledged_by = Some(actor.to_string());
                self.acknowledged_at_ms = Some(now_ms);
                Ok(())
            }
        }
    }

    pub fn resolve(&mut self, now_ms: i64) -> bool {
        if self.resolved {
            return false;
        }
        self.resolved = true;
        self.resolved_at_ms = Some(now_ms);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub source_id: Option<String>,
    pub metric_type: String,
    pub severity: Severity,
    pub triggering_value: f64,
    pub threshold_value: f64,
    pub rule_id: Option<String>,
    pub message: String,
    pub created_at_ms: i64,
}

impl NewAlert {
    pub fn key(&self) -> AlertKey {
        AlertKey {
            source_id: self.source_id.clone(),
            metric_type: self.metric_type.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_metric_type(&self.metric_type).map_err(LedgerError::InvalidInput)?;
        if !self.triggering_value.is_finite() || !self.threshold_value.is_finite() {
            return Err(LedgerError::InvalidInput(
                "triggering_value and threshold_value must be finite numbers".into(),
            ));
        }
        if matches!(&self.source_id, Some(s) if s.trim().is_empty()) {
            return Err(LedgerError::InvalidInput("source_id must not be empty".into()));
        }
        Ok(())
    }

    pub fn into_alert(self, id: String) -> Alert {
        Alert {
            id,
            source_id: self.source_id,
            metric_type: self.metric_type,
            severity: self.severity,
            triggering_value: self.triggering_value,
            threshold_value: self.threshold_value,
            rule_id: self.rule_id,
            message: self.message,
            acknowledged: false,
            acknowledged_by: None,
            acknowledged_at_ms: None,
            resolved: false,
            resolved_at_ms: None,
            created_at_ms: self.created_at_ms,
        }
    }
}
