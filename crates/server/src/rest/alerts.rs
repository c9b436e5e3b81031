use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use std::str::FromStr;

use fleetwatch_common::alert::{Alert, AlertFilter, AlertStats, NewAlert};
use fleetwatch_common::clock::now_ms;
use fleetwatch_common::time_range::TimeRange;
use fleetwatch_common::Severity;

use crate::middleware::Caller;
use crate::rest::error::ApiError;
use crate::rest::AppState;

// Strings so that `?acknowledged=` reads as "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct AlertQuery {
    pub severity: Option<String>,
    pub source_id: Option<String>,
    pub metric_type: Option<String>,
    pub acknowledged: Option<String>,
    pub resolved: Option<String>,
    pub time_range: Option<String>,
    pub since_ms: Option<String>,
    pub until_ms: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl AlertQuery {
    // With both `time_range` and `since_ms`, the later bound wins.
    pub fn into_filter(self, now_ms: i64) -> Result<AlertFilter, ApiError> {
        let severity = non_empty(self.severity)
            .as_deref()
            .map(str::parse::<Severity>)
            .transpose()?;
        let window_start = parse_window(self.time_range.as_deref(), now_ms)?;
        let since_param: Option<i64> = parse_param("since_ms", self.since_ms)?;
        let until_ms: Option<i64> = parse_param("until_ms", self.until_ms)?;
        let since_ms = match (window_start, since_param) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        if let (Some(since), Some(until)) = (since_ms, until_ms) {
            if since >= until {
                return Err(ApiError::InvalidInput("since must be before until".into()));
            }
        }

        Ok(AlertFilter {
            severity,
            source_id: non_empty(self.source_id),
            metric_type: non_empty(self.metric_type),
            acknowledged: parse_param("acknowledged", self.acknowledged)?,
            resolved: parse_param("resolved", self.resolved)?,
            since_ms,
            until_ms,
            limit: parse_param("limit", self.limit)?,
            offset: parse_param("offset", self.offset)?.unwrap_or(0),
        })
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

fn parse_param<T: FromStr>(name: &str, raw: Option<String>) -> Result<Option<T>, ApiError> {
    match non_empty(raw) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ApiError::InvalidInput(format!("invalid value '{raw}' for {name}"))),
        None => Ok(None),
    }
}

fn parse_window(time_range: Option<&str>, now_ms: i64) -> Result<Option<i64>, ApiError> {
    match time_range.filter(|s| !s.is_empty()) {
        Some(raw) => {
            let range: TimeRange = raw.parse()?;
            Ok(Some(range.since_ms(now_ms)))
        }
        None => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub time_range: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAlertRequest {
    pub source_id: Option<String>,
    pub metric_type: String,
    pub severity: Option<String>,
    pub triggering_value: f64,
    pub threshold_value: Option<f64>,
    pub rule_id: Option<String>,
    pub message: Option<String>,
}

impl CreateAlertRequest {
    fn into_new_alert(self, now_ms: i64) -> Result<NewAlert, ApiError> {
        let severity = match self.severity.as_deref() {
            Some(raw) => raw.parse::<Severity>()?,
            None => Severity::Info,
        };
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("manual {severity} alert for {}", self.metric_type));
        Ok(NewAlert {
            source_id: self.source_id,
            metric_type: self.metric_type,
            severity,
            triggering_value: self.triggering_value,
            threshold_value: self.threshold_value.unwrap_or(self.triggering_value),
            rule_id: self.rule_id,
            message,
            created_at_ms: now_ms,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AcknowledgeRequest {
    pub acknowledged_by: Option<String>,
}

pub async fn list_alerts(
    State(state): State<AppState>,
    query: Result<Query<AlertQuery>, QueryRejection>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    let Query(query) = query?;
    let filter = query.into_filter(now_ms())?;
    let alerts = state.ledger.list(&filter).await?;
    Ok(Json(alerts))
}

pub async fn create_alert(
    State(state): State<AppState>,
    body: Result<Json<CreateAlertRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Alert>), ApiError> {
    let Json(body) = body?;
    let alert = state.ledger.create(body.into_new_alert(now_ms())?).await?;
    state.metrics.inc_alerts_created();
    tracing::info!(
        alert_id = %alert.id,
        metric_type = %alert.metric_type,
        severity = %alert.severity,
        "manual alert created"
    );
    Ok((StatusCode::CREATED, Json(alert)))
}

pub async fn alert_stats(
    State(state): State<AppState>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<AlertStats>, ApiError> {
    let Query(query) = query?;
    let since = parse_window(query.time_range.as_deref(), now_ms())?;
    let stats = state.ledger.stats(since).await?;
    Ok(Json(stats))
}

pub async fn get_alert(State(state): State<AppState>, Path(alert_id): Path<String>) -> Result<Json<Alert>, ApiError> {
    let alert = state.ledger.get(&alert_id).await?;
    Ok(Json(alert))
}

pub async fn delete_alert(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(alert_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !caller.can_delete() {
        return Err(ApiError::Forbidden("deleting alerts requires the admin role".into()));
    }
    state.ledger.delete(&alert_id).await?;
    state.metrics.inc_alerts_deleted();
    tracing::info!(alert_id = %alert_id, actor = caller.actor().unwrap_or("anonymous"), "alert deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn acknowledge_alert(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(alert_id): Path<String>,
    body: Bytes,
) -> Result<Json<Alert>, ApiError> {
    let request = parse_ack_body(&body)?;
    let actor = match caller.actor() {
        Some(sub) => sub.to_string(),
        None => request
            .acknowledged_by
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| ApiError::InvalidInput("acknowledged_by is required".into()))?,
    };

    let alert = state.ledger.acknowledge(&alert_id, &actor, now_ms()).await?;
    state.metrics.inc_alerts_acknowledged();
    tracing::info!(alert_id = %alert.id, actor = %actor, "alert acknowledged");
    Ok(Json(alert))
}

fn parse_ack_body(body: &[u8]) -> Result<AcknowledgeRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(AcknowledgeRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidInput(format!("invalid acknowledge body: {e}")))
}

pub async fn resolve_alert(State(state): State<AppState>, Path(alert_id): Path<String>) -> Result<Json<Alert>, ApiError> {
    let alert = state.ledger.resolve(&alert_id, now_ms()).await?;
    state.metrics.inc_alerts_resolved();
    tracing::info!(alert_id = %alert.id, "alert resolved");
    Ok(Json(alert))
}
