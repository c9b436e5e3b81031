use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Default)]
pub struct WorkerMetrics {
    messages_acked: AtomicU64,
    messages_nacked: AtomicU64,
    decode_errors: AtomicU64,
    samples_processed: AtomicU64,
    ingest_errors: AtomicU64,
    rows_written: AtomicU64,
    write_failures: AtomicU64,
    alerts_created: AtomicU64,
    alerts_suppressed: AtomicU64,
    notifications_sent: AtomicU64,
    notifications_failed: AtomicU64,
    alerts_purged: AtomicU64,
    threshold_refreshes: AtomicU64,
    threshold_refresh_errors: AtomicU64,
    processing_latency_sum_us: AtomicU64,
    processing_latency_count: AtomicU64,
    db_latency_sum_us: AtomicU64,
    db_latency_count: AtomicU64,
}

impl WorkerMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_messages_acked(&self) {
        self.messages_acked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_messages_nacked(&self) {
        self.messages_nacked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_decode_errors(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_samples_processed(&self) {
        self.samples_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_ingest_errors(&self) {
        self.ingest_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_write_failures(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_written(&self, count: u64) {
        self.rows_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_alerts_created(&self) {
        self.alerts_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_alerts_suppressed(&self) {
        self.alerts_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_notifications_sent(&self) {
        self.notifications_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_notifications_failed(&self) {
        self.notifications_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_alerts_purged(&self, count: u64) {
        self.alerts_purged.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_threshold_refreshes(&self) {
        self.threshold_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_threshold_refresh_errors(&self) {
        self.threshold_refresh_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_processing_latency(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.processing_latency_sum_us.fetch_add(us, Ordering::Relaxed);
        self.processing_latency_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_db_latency(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.db_latency_sum_us.fetch_add(us, Ordering::Relaxed);
        self.db_latency_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn messages_acked_val(&self) -> u64 {
        self.messages_acked.load(Ordering::Relaxed)
    }

    pub fn messages_nacked_val(&self) -> u64 {
        self.messages_nacked.load(Ordering::Relaxed)
    }

    pub fn decode_errors_val(&self) -> u64 {
        self.decode_errors.load(Ordering::Relaxed)
    }

    pub fn samples_processed_val(&self) -> u64 {
        self.samples_processed.load(Ordering::Relaxed)
    }

    pub fn ingest_errors_val(&self) -> u64 {
        self.ingest_errors.load(Ordering::Relaxed)
    }

    pub fn rows_written_val(&self) -> u64 {
        self.rows_written.load(Ordering::Relaxed)
    }

    pub fn write_failures_val(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    pub fn alerts_created_val(&self) -> u64 {
        self.alerts_created.load(Ordering::Relaxed)
    }

    pub fn alerts_suppressed_val(&self) -> u64 {
        self.alerts_suppressed.load(Ordering::Relaxed)
    }

    pub fn notifications_sent_val(&self) -> u64 {
        self.notifications_sent.load(Ordering::Relaxed)
    }

    pub fn notifications_failed_val(&self) -> u64 {
        self.notifications_failed.load(Ordering::Relaxed)
    }

    pub fn alerts_purged_val(&self) -> u64 {
        self.alerts_purged.load(Ordering::Relaxed)
    }

    pub fn threshold_refreshes_val(&self) -> u64 {
        self.threshold_refreshes.load(Ordering::Relaxed)
    }

    pub fn threshold_refresh_errors_val(&self) -> u64 {
        self.threshold_refresh_errors.load(Ordering::Relaxed)
    }

    pub fn processing_latency_vals(&self) -> (u64, u64) {
        (
            self.processing_latency_sum_us.load(Ordering::Relaxed),
            self.processing_latency_count.load(Ordering::Relaxed),
        )
    }

    pub fn db_latency_vals(&self) -> (u64, u64) {
        (
            self.db_latency_sum_us.load(Ordering::Relaxed),
            self.db_latency_count.load(Ordering::Relaxed),
        )
    }
}
