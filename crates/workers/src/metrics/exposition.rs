use std::fmt::Write;
use std::sync::Arc;

use super::worker_metrics::WorkerMetrics;

pub fn render_prometheus(m: &Arc<WorkerMetrics>) -> String {
    let mut out = String::with_capacity(1536);

    write_counter(&mut out, "fleetwatch_worker_messages_acked_total", m.messages_acked_val());
    write_counter(&mut out, "fleetwatch_worker_messages_nacked_total", m.messages_nacked_val());
    write_counter(&mut out, "fleetwatch_worker_decode_errors_total", m.decode_errors_val());
    write_counter(&mut out, "fleetwatch_worker_samples_processed_total", m.samples_processed_val());
    write_counter(&mut out, "fleetwatch_worker_ingest_errors_total", m.ingest_errors_val());
    write_counter(&mut out, "fleetwatch_worker_rows_written_total", m.rows_written_val());
    write_counter(&mut out, "fleetwatch_worker_write_failures_total", m.write_failures_val());
    write_counter(&mut out, "fleetwatch_worker_alerts_created_total", m.alerts_created_val());
    write_counter(&mut out, "fleetwatch_worker_alerts_suppressed_total", m.alerts_suppressed_val());
    write_counter(&mut out, "fleetwatch_worker_notifications_sent_total", m.notifications_sent_val());
    write_counter(&mut out, "fleetwatch_worker_notifications_failed_total", m.notifications_failed_val());
    write_counter(&mut out, "fleetwatch_worker_alerts_purged_total", m.alerts_purged_val());
    write_counter(&mut out, "fleetwatch_worker_threshold_refreshes_total", m.threshold_refreshes_val());
    write_counter(
        &mut out,
        "fleetwatch_worker_threshold_refresh_errors_total",
        m.threshold_refresh_errors_val(),
    );

    let (sum, count) = m.processing_latency_vals();
    write_summary(&mut out, "fleetwatch_worker_processing_latency_us", sum, count);

    let (sum, count) = m.db_latency_vals();
    write_summary(&mut out, "fleetwatch_worker_db_latency_us", sum, count);

    out
}

fn write_counter(out: &mut String, name: &str, val: u64) {
    let _ = writeln!(out, "# TYPE {name} counter");
    let _ = writeln!(out, "{name} {val}");
}

fn write_summary(out: &mut String, name: &str, sum: u64, count: u64) {
    let _ = writeln!(out, "# TYPE {name} summary");
    let _ = writeln!(out, "{name}_sum {sum}");
    let _ = writeln!(out, "{name}_count {count}");
}
