use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use fleetwatch_common::alert::{Alert, AlertFilter, AlertStats, NewAlert};
use fleetwatch_common::ledger::{AlertLedger, LedgerError, MemoryLedger, RaiseOutcome};
use fleetwatch_common::threshold::ThresholdStore;
use fleetwatch_common::Severity;
use fleetwatch_server::auth::{create_token, Claims};
use fleetwatch_server::metrics::server_metrics::ServerMetrics;
use fleetwatch_server::middleware::RateLimiter;
use fleetwatch_server::rest::{router, AppState};
use fleetwatch_server::store::ThresholdService;

const SECRET: &[u8] = b"test-secret";

fn state_with(ledger: Arc<dyn AlertLedger>, jwt_secret: Option<Vec<u8>>) -> AppState {
    AppState {
        ledger,
        thresholds: ThresholdService::in_memory(ThresholdStore::new()),
        metrics: ServerMetrics::new(),
        jwt_secret,
        rate_limiter: RateLimiter::new(10_000),
    }
}

fn open_state() -> AppState {
    state_with(Arc::new(MemoryLedger::new()), None)
}

fn token(role: Option<&str>) -> String {
    let claims = Claims {
        sub: "kim".into(),
        role: role.map(str::to_string),
        exp: 4_102_444_800,
    };
    create_token(SECRET, &claims).unwrap()
}

fn request(method: &str, uri: &str, body: Option<Value>, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn seed_alert(state: &AppState, severity: Severity, source: &str, created_at_ms: i64) -> Alert {
    state
        .ledger
        .create(NewAlert {
            source_id: Some(source.into()),
            metric_type: "temperature".into(),
            severity,
            triggering_value: 80.0,
            threshold_value: 75.0,
            rule_id: None,
            message: "temperature high".into(),
            created_at_ms,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn healthz_returns_ok() {
    let (status, body) = send(&open_state(), request("GET", "/healthz", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn ready_pings_ledger() {
    let (status, _) = send(&open_state(), request("GET", "/ready", None, None)).await;
    assert_eq!(status, StatusCode::OK);

    let down = state_with(Arc::new(DownLedger), None);
    let resp = router(down).oneshot(request("GET", "/ready", None, None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "5");
}

#[tokio::test]
async fn create_and_get_alert() {
    let state = open_state();
    let (status, created) = send(
        &state,
        request(
            "POST",
            "/v1/alerts",
            Some(json!({"metric_type": "battery", "source_id": "robot-1", "severity": "warning", "triggering_value": 11.5})),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["severity"], "warning");
    assert_eq!(created["threshold_value"], 11.5);

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&state, request("GET", &format!("/v1/alerts/{id}"), None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], id);
    assert_eq!(state.metrics.alerts_created_total(), 1);
}

#[tokio::test]
async fn create_rejects_bad_input() {
    let state = open_state();
    let (status, body) = send(
        &state,
        request("POST", "/v1/alerts", Some(json!({"metric_type": "battery", "severity": "panic", "triggering_value": 1.0})), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");

    let (status, _) = send(&state, request("POST", "/v1/alerts", Some(json!({"severity": "info"})), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_alert_is_not_found() {
    let state = open_state();
    let (status, body) = send(&state, request("GET", "/v1/alerts/missing", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = send(
        &state,
        request("POST", "/v1/alerts/missing/acknowledge", Some(json!({"acknowledged_by": "kim"})), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn acknowledge_then_conflicts() {
    let state = open_state();
    let alert = seed_alert(&state, Severity::Warning, "robot-1", 1_000).await;
    let uri = format!("/v1/alerts/{}/acknowledge", alert.id);

    let (status, body) = send(&state, request("POST", &uri, Some(json!({"acknowledged_by": "kim"})), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["acknowledged"], true);
    assert_eq!(body["acknowledged_by"], "kim");

    let (status, body) = send(&state, request("POST", &uri, Some(json!({"acknowledged_by": "lee"})), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn acknowledge_without_actor_is_rejected() {
    let state = open_state();
    let alert = seed_alert(&state, Severity::Warning, "robot-1", 1_000).await;
    let (status, _) = send(&state, request("POST", &format!("/v1/alerts/{}/acknowledge", alert.id), None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resolve_is_idempotent_and_blocks_acknowledge() {
    let state = open_state();
    let alert = seed_alert(&state, Severity::Critical, "robot-1", 1_000).await;
    let uri = format!("/v1/alerts/{}/resolve", alert.id);

    let (status, first) = send(&state, request("POST", &uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["resolved"], true);

    let (status, second) = send(&state, request("POST", &uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);

    let (status, _) = send(
        &state,
        request("POST", &format!("/v1/alerts/{}/acknowledge", alert.id), Some(json!({"acknowledged_by": "kim"})), None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn list_filters_and_orders() {
    let state = open_state();
    seed_alert(&state, Severity::Warning, "robot-1", 1_000).await;
    seed_alert(&state, Severity::Critical, "robot-2", 2_000).await;
    seed_alert(&state, Severity::Warning, "robot-2", 3_000).await;

    let (status, body) = send(&state, request("GET", "/v1/alerts", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let times: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["created_at_ms"].as_i64().unwrap())
        .collect();
    assert_eq!(times, vec![3_000, 2_000, 1_000]);

    let (_, body) = send(&state, request("GET", "/v1/alerts?severity=warning&source_id=robot-2", None, None)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&state, request("GET", "/v1/alerts?limit=1&offset=1", None, None)).await;
    assert_eq!(body[0]["created_at_ms"], 2_000);

    let (status, _) = send(&state, request("GET", "/v1/alerts?time_range=5y", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_count_open_and_resolved() {
    let state = open_state();
    let now = fleetwatch_common::clock::now_ms();
    seed_alert(&state, Severity::Warning, "robot-1", now).await;
    seed_alert(&state, Severity::Warning, "robot-2", now).await;
    seed_alert(&state, Severity::Critical, "robot-3", now).await;
    let closed = seed_alert(&state, Severity::Critical, "robot-4", now).await;
    state.ledger.resolve(&closed.id, now).await.unwrap();

    let (status, body) = send(&state, request("GET", "/v1/alerts/stats?time_range=24h", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["critical"], 2);
    assert_eq!(body["warning"], 2);
    assert_eq!(body["unresolved"], 3);
    assert_eq!(body["unacknowledged"], 3);
}

#[tokio::test]
async fn threshold_crud() {
    let state = open_state();
    let rule = json!({"metric_type": "temperature", "warning_value": 60.0, "critical_value": 75.0});

    let (status, created) = send(&state, request("POST", "/v1/thresholds", Some(rule.clone()), None)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(&state, request("POST", "/v1/thresholds", Some(rule), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let uri = format!("/v1/thresholds/{id}");
    let (status, updated) = send(&state, request("PUT", &uri, Some(json!({"critical_value": 90.0})), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["critical_value"], 90.0);
    assert_eq!(updated["warning_value"], 60.0);

    let (status, _) = send(&state, request("PUT", &uri, Some(json!({"metric_type": "humidity"})), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, list) = send(&state, request("GET", "/v1/thresholds", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send(&state, request("DELETE", &uri, None, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&state, request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(state.metrics.threshold_changes_total(), 3);
}

#[tokio::test]
async fn threshold_update_keeps_existing_alerts() {
    let state = open_state();
    let rule = json!({"metric_type": "temperature", "warning_value": 60.0, "critical_value": 75.0});
    let (_, created) = send(&state, request("POST", "/v1/thresholds", Some(rule), None)).await;
    let rule_id = created["id"].as_str().unwrap().to_string();

    let alert = state
        .ledger
        .create(NewAlert {
            source_id: Some("robot-1".into()),
            metric_type: "temperature".into(),
            severity: Severity::Critical,
            triggering_value: 82.0,
            threshold_value: 75.0,
            rule_id: Some(rule_id.clone()),
            message: "temperature 82 reached critical threshold 75".into(),
            created_at_ms: 1_000,
        })
        .await
        .unwrap();

    let (status, _) = send(
        &state,
        request(
            "PUT",
            &format!("/v1/thresholds/{rule_id}"),
            Some(json!({"warning_value": 85.0, "critical_value": 95.0})),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&state, request("GET", &format!("/v1/alerts/{}", alert.id), None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["severity"], "critical");
    assert_eq!(body["threshold_value"], 75.0);
    assert_eq!(body["message"], "temperature 82 reached critical threshold 75");
}

#[tokio::test]
async fn empty_query_values_mean_no_filter() {
    let state = open_state();
    seed_alert(&state, Severity::Warning, "robot-1", 1_000).await;
    seed_alert(&state, Severity::Critical, "robot-2", 2_000).await;

    let (status, body) = send(
        &state,
        request("GET", "/v1/alerts?severity=&acknowledged=&resolved=&limit=&offset=&source_id=", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(&state, request("GET", "/v1/alerts?acknowledged=yes", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn threshold_warning_must_be_below_critical() {
    let state = open_state();
    let (status, body) = send(
        &state,
        request(
            "POST",
            "/v1/thresholds",
            Some(json!({"metric_type": "temperature", "warning_value": 80.0, "critical_value": 75.0})),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn auth_requires_valid_bearer() {
    let state = state_with(Arc::new(MemoryLedger::new()), Some(SECRET.to_vec()));

    let (status, body) = send(&state, request("GET", "/v1/alerts", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = send(&state, request("GET", "/v1/alerts", None, Some("not.a.token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&state, request("GET", "/v1/alerts", None, Some(&token(None)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.metrics.auth_failures_total(), 2);

    let (status, _) = send(&state, request("GET", "/healthz", None, None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn token_subject_is_the_acknowledging_actor() {
    let state = state_with(Arc::new(MemoryLedger::new()), Some(SECRET.to_vec()));
    let alert = seed_alert(&state, Severity::Warning, "robot-1", 1_000).await;

    let (status, body) = send(
        &state,
        request(
            "POST",
            &format!("/v1/alerts/{}/acknowledge", alert.id),
            Some(json!({"acknowledged_by": "someone-else"})),
            Some(&token(None)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["acknowledged_by"], "kim");
}

#[tokio::test]
async fn delete_requires_admin_role() {
    let state = state_with(Arc::new(MemoryLedger::new()), Some(SECRET.to_vec()));
    let alert = seed_alert(&state, Severity::Warning, "robot-1", 1_000).await;
    let uri = format!("/v1/alerts/{}", alert.id);

    let (status, body) = send(&state, request("DELETE", &uri, None, Some(&token(Some("operator"))))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = send(&state, request("DELETE", &uri, None, Some(&token(Some("admin"))))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&state, request("GET", &uri, None, Some(&token(None)))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unavailable_ledger_maps_to_503() {
    let state = state_with(Arc::new(DownLedger), None);
    let resp = router(state)
        .oneshot(request("GET", "/v1/alerts", None, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "5");
}

#[tokio::test]
async fn rate_limit_returns_429() {
    let mut state = open_state();
    state.rate_limiter = RateLimiter::new(2);
    let app = router(state.clone());

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let resp = app.clone().oneshot(request("GET", "/healthz", None, None)).await.unwrap();
        statuses.push(resp.status());
    }
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]);
    assert_eq!(state.metrics.rate_limited_total(), 1);
}

#[tokio::test]
async fn metrics_endpoint_renders_counters() {
    let state = open_state();
    send(&state, request("GET", "/healthz", None, None)).await;

    let resp = router(state.clone())
        .oneshot(request("GET", "/metrics", None, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("fleetwatch_server_rest_requests_total"));
    assert!(text.contains("# TYPE fleetwatch_server_rest_latency_us summary"));
}

struct DownLedger;

#[async_trait]
impl AlertLedger for DownLedger {
    async fn create(&self, _alert: NewAlert) -> Result<Alert, LedgerError> {
        Err(down())
    }

    async fn raise(&self, _alert: NewAlert) -> Result<RaiseOutcome, LedgerError> {
        Err(down())
    }

    async fn get(&self, _id: &str) -> Result<Alert, LedgerError> {
        Err(down())
    }

    async fn list(&self, _filter: &AlertFilter) -> Result<Vec<Alert>, LedgerError> {
        Err(down())
    }

    async fn acknowledge(&self, _id: &str, _actor: &str, _now_ms: i64) -> Result<Alert, LedgerError> {
        Err(down())
    }

    async fn resolve(&self, _id: &str, _now_ms: i64) -> Result<Alert, LedgerError> {
        Err(down())
    }

    async fn delete(&self, _id: &str) -> Result<(), LedgerError> {
        Err(down())
    }

    async fn stats(&self, _since_ms: Option<i64>) -> Result<AlertStats, LedgerError> {
        Err(down())
    }

    async fn purge_resolved_before(&self, _cutoff_ms: i64) -> Result<u64, LedgerError> {
        Err(down())
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        Err(down())
    }
}

fn down() -> LedgerError {
    LedgerError::Unavailable("connection refused".into())
}
