pub mod alert;
pub mod clock;
pub mod crypto;
pub mod db;
pub mod ledger;
pub mod nats_config;
pub mod retry;
pub mod sample;
pub mod severity;
pub mod threshold;
pub mod time_range;

pub use severity::Severity;
