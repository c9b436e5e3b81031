pub mod exposition;
pub mod server_metrics;
