use std::fmt::Write;
use std::sync::Arc;

use super::server_metrics::ServerMetrics;

pub fn render_prometheus(m: &Arc<ServerMetrics>) -> String {
    let mut out = String::with_capacity(1024);

    write_counter(&mut out, "fleetwatch_server_rest_requests_total", m.rest_requests_total());
    write_counter(&mut out, "fleetwatch_server_rest_errors_total", m.rest_errors_total());
    write_counter(&mut out, "fleetwatch_server_alerts_created_total", m.alerts_created_total());
    write_counter(&mut out, "fleetwatch_server_alerts_acknowledged_total", m.alerts_acknowledged_total());
    write_counter(&mut out, "fleetwatch_server_alerts_resolved_total", m.alerts_resolved_total());
    write_counter(&mut out, "fleetwatch_server_alerts_deleted_total", m.alerts_deleted_total());
    write_counter(&mut out, "fleetwatch_server_threshold_changes_total", m.threshold_changes_total());
    write_counter(&mut out, "fleetwatch_server_auth_failures_total", m.auth_failures_total());
    write_counter(&mut out, "fleetwatch_server_rate_limited_total", m.rate_limited_total());

    let (sum, count) = m.rest_latency_vals();
    write_summary(&mut out, "fleetwatch_server_rest_latency_us", sum, count);

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
