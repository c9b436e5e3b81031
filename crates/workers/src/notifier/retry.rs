use async_trait::async_trait;

use fleetwatch_common::retry::{retry_async, RetryConfig};

use super::channel::{AlertNotification, Notifier, NotifyError};

pub struct RetryNotifier<N: Notifier> {
    inner: N,
    config: RetryConfig,
}

impl<N: Notifier> RetryNotifier<N> {
    pub fn new(inner: N, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl<N: Notifier> Notifier for RetryNotifier<N> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn send(&self, notification: &AlertNotification) -> Result<(), NotifyError> {
        retry_async(&self.config, self.inner.name(), |_| true, || {
            self.inner.send(notification)
        })
        .await
    }
}
