use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Default)]
pub struct ServerMetrics {
    rest_requests_total: AtomicU64,
    rest_errors_total: AtomicU64,
    alerts_created_total: AtomicU64,
    alerts_acknowledged_total: AtomicU64,
    alerts_resolved_total: AtomicU64,
    alerts_deleted_total: AtomicU64,
    threshold_changes_total: AtomicU64,
    auth_failures_total: AtomicU64,
    rate_limited_total: AtomicU64,
    rest_latency_sum_us: AtomicU64,
    rest_latency_count: AtomicU64,
}

impl ServerMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_rest_requests(&self) {
        self.rest_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rest_errors(&self) {
        self.rest_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_alerts_created(&self) {
        self.alerts_created_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_alerts_acknowledged(&self) {
        self.alerts_acknowledged_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_alerts_resolved(&self) {
        self.alerts_resolved_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_alerts_deleted(&self) {
        self.alerts_deleted_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_threshold_changes(&self) {
        self.threshold_changes_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_auth_failures(&self) {
        self.auth_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rate_limited(&self) {
        self.rate_limited_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rest_latency(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.rest_latency_sum_us.fetch_add(us, Ordering::Relaxed);
        self.rest_latency_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rest_requests_total(&self) -> u64 {
        self.rest_requests_total.load(Ordering::Relaxed)
    }

    pub fn rest_errors_total(&self) -> u64 {
        self.rest_errors_total.load(Ordering::Relaxed)
    }

    pub fn alerts_created_total(&self) -> u64 {
        self.alerts_created_total.load(Ordering::Relaxed)
    }

    pub fn alerts_acknowledged_total(&self) -> u64 {
        self.alerts_acknowledged_total.load(Ordering::Relaxed)
    }

    pub fn alerts_resolved_total(&self) -> u64 {
        self.alerts_resolved_total.load(Ordering::Relaxed)
    }

    pub fn alerts_deleted_total(&self) -> u64 {
        self.alerts_deleted_total.load(Ordering::Relaxed)
    }

    pub fn threshold_changes_total(&self) -> u64 {
        self.threshold_changes_total.load(Ordering::Relaxed)
    }

    pub fn auth_failures_total(&self) -> u64 {
        self.auth_failures_total.load(Ordering::Relaxed)
    }

    pub fn rate_limited_total(&self) -> u64 {
        self.rate_limited_total.load(Ordering::Relaxed)
    }

    pub fn rest_latency_vals(&self) -> (u64, u64) {
        (
            self.rest_latency_sum_us.load(Ordering::Relaxed),
            self.rest_latency_count.load(Ordering::Relaxed),
        )
    }
}
