pub mod exposition;
pub mod worker_metrics;
