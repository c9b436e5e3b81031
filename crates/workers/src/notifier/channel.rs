use async_trait::async_trait;
use serde::Serialize;

use fleetwatch_common::alert::Alert;

pub const ALERT_CREATED: &str = "alert.created";

#[derive(Debug, Clone, Serialize)]
pub struct AlertNotification {
    pub event: &'static str,
    pub alert: Alert,
}

impl AlertNotification {
    pub fn created(alert: Alert) -> Self {
        Self {
            event: ALERT_CREATED,
            alert,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, notification: &AlertNotification) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotifyError(pub String);

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "notify: {}", self.0)
    }
}

impl std::error::Error for NotifyError {}
