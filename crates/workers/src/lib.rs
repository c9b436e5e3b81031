pub mod alert;
pub mod api;
pub mod config;
pub mod consumer;
pub mod maintenance;
pub mod metrics;
pub mod notifier;
pub mod pipeline;
pub mod storage;
