use super::record::Alert;
use crate::severity::Severity;

pub const DEFAULT_LIST_LIMIT: usize = 100;
pub const MAX_LIST_LIMIT: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertFilter {
    pub severity: Option<Severity>,
    pub source_id: Option<String>,
    pub metric_type: Option<String>,
    pub acknowledged: Option<bool>,
    pub resolved: Option<bool>,
    pub since_ms: Option<i64>,
    pub until_ms: Option<i64>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        if self.severity.is_some_and(|s| s != alert.severity) {
            return false;
        }
        if let Some(src) = &self.source_id {
            if alert.source_id.as_deref() != Some(src.as_str()) {
                return false;
            }
        }
        if let Some(metric) = &self.metric_type {
            if &alert.metric_type != metric {
                return false;
            }
        }
        if self.acknowledged.is_some_and(|a| a != alert.acknowledged) {
            return false;
        }
        if self.resolved.is_some_and(|r| r != alert.resolved) {
            return false;
        }
        if self.since_ms.is_some_and(|t| alert.created_at_ms < t) {
            return false;
        }
        if self.until_ms.is_some_and(|t| alert.created_at_ms >= t) {
            return false;
        }
        true
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
    }
}
