use serde::{Deserialize, Serialize};

use super::record::Alert;
use crate::severity::Severity;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStats {
    pub total: u64,
    pub critical: u64,
    pub warning: u64,
    pub info: u64,
    pub unacknowledged: u64,
    pub unresolved: u64,
}

impl AlertStats {
    pub fn record(&mut self, alert: &Alert) {
        self.total += 1;
        match alert.severity {
            Severity::Critical => self.critical += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
        }
        if !alert.resolved {
            self.unresolved += 1;
            if !alert.acknowledged {
                self.unacknowledged += 1;
            }
        }
    }
}
