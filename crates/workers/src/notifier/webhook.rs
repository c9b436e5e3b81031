use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use fleetwatch_common::crypto::sign_data;

use super::channel::{AlertNotification, Notifier, NotifyError};

pub const SIGNATURE_HEADER: &str = "X-FleetWatch-Signature";

pub struct WebhookNotifier {
    url: String,
    secret: Option<Vec<u8>>,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(url: String, secret: Option<Vec<u8>>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError(e.to_string()))?;
        Ok(Self {
            url,
            secret,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send(&self, notification: &AlertNotification) -> Result<(), NotifyError> {
        let body = serde_json::to_vec(notification).map_err(|e| NotifyError(e.to_string()))?;

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json");
        if let Some(secret) = &self.secret {
            request = request.header(SIGNATURE_HEADER, sign_data(secret, &body));
        }

        request
            .body(body)
            .send()
            .await
            .map_err(|e| NotifyError(e.to_string()))?
            .error_for_status()
            .map_err(|e| NotifyError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetwatch_common::alert::NewAlert;
    use fleetwatch_common::crypto::verify_signature;
    use fleetwatch_common::Severity;

    #[test]
    fn notification_body_shape() {
        let alert = NewAlert {
            source_id: Some("robot-1".into()),
            metric_type: "temperature".into(),
            severity: Severity::Critical,
            triggering_value: 82.0,
            threshold_value: 75.0,
            rule_id: None,
            message: String::new(),
            created_at_ms: 1_000,
        }
        .into_alert("a-1".into());
        let body = serde_json::to_vec(&AlertNotification::created(alert)).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["event"], "alert.created");
        assert_eq!(json["alert"]["id"], "a-1");
        assert_eq!(json["alert"]["severity"], "critical");

        let sig = sign_data(b"hook-secret", &body);
        assert!(verify_signature(b"hook-secret", &body, &sig));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_error() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:1/hook".into(), None).unwrap();
        let alert = NewAlert {
            source_id: None,
            metric_type: "temperature".into(),
            severity: Severity::Info,
            triggering_value: 1.0,
            threshold_value: 1.0,
            rule_id: None,
            message: String::new(),
            created_at_ms: 0,
        }
        .into_alert("a-2".into());
        assert!(notifier.send(&AlertNotification::created(alert)).await.is_err());
    }
}
