mod channel;
mod retry;
mod webhook;

pub use channel::{AlertNotification, Notifier, NotifyError, ALERT_CREATED};
pub use retry::RetryNotifier;
pub use webhook::{WebhookNotifier, SIGNATURE_HEADER};
