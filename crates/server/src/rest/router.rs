use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

use fleetwatch_common::ledger::AlertLedger;

use super::{alerts, health, metrics, thresholds};
use crate::metrics::server_metrics::ServerMetrics;
use crate::middleware::{rate_limit, request_metrics, require_auth, RateLimiter};
use crate::store::ThresholdService;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn AlertLedger>,
    pub thresholds: ThresholdService,
    pub metrics: Arc<ServerMetrics>,
    pub jwt_secret: Option<Vec<u8>>,
    pub rate_limiter: RateLimiter,
}

pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/v1/alerts", get(alerts::list_alerts).post(alerts::create_alert))
        .route("/v1/alerts/stats", get(alerts::alert_stats))
        .route(
            "/v1/alerts/{alert_id}",
            get(alerts::get_alert).delete(alerts::delete_alert),
        )
        .route("/v1/alerts/{alert_id}/acknowledge", post(alerts::acknowledge_alert))
        .route("/v1/alerts/{alert_id}/resolve", post(alerts::resolve_alert))
        .route(
            "/v1/thresholds",
            get(thresholds::list_thresholds).post(thresholds::create_threshold),
        )
        .route(
            "/v1/thresholds/{rule_id}",
            get(thresholds::get_threshold)
                .put(thresholds::update_threshold)
                .delete(thresholds::delete_threshold),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/ready", get(health::ready))
        .route("/metrics", get(metrics::metrics))
        .merge(v1)
        .layer(from_fn_with_state(state.clone(), rate_limit::enforce))
        .layer(from_fn_with_state(state.metrics.clone(), request_metrics::track))
        .with_state(state)
}
