use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

use fleetwatch_common::ledger::AlertLedger;

use super::{health, metrics};
use crate::metrics::worker_metrics::WorkerMetrics;

#[derive(Clone)]
pub struct ApiState {
    pub metrics: Arc<WorkerMetrics>,
    pub ledger: Arc<dyn AlertLedger>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/ready", get(health::ready))
        .route("/metrics", get(metrics::metrics))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: ApiState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}
