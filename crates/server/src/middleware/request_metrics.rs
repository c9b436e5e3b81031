use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::metrics::server_metrics::ServerMetrics;

pub async fn track(State(metrics): State<Arc<ServerMetrics>>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    metrics.inc_rest_requests();
    let response = next.run(request).await;
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        metrics.inc_rest_errors();
    }
    metrics.record_rest_latency(start);
    response
}
