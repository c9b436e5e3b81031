use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use fleetwatch_common::threshold::{ThresholdDraft, ThresholdPatch, ThresholdRule};

use crate::rest::error::ApiError;
use crate::rest::AppState;

pub async fn list_thresholds(State(state): State<AppState>) -> Json<Vec<ThresholdRule>> {
    Json(state.thresholds.list())
}

pub async fn get_threshold(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
) -> Result<Json<ThresholdRule>, ApiError> {
    Ok(Json(state.thresholds.get(&rule_id)?))
}

pub async fn create_threshold(
    State(state): State<AppState>,
    body: Result<Json<ThresholdDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<ThresholdRule>), ApiError> {
    let Json(draft) = body?;
    let rule = state.thresholds.create(draft).await?;
    state.metrics.inc_threshold_changes();
    tracing::info!(
        rule_id = %rule.id,
        metric_type = %rule.metric_type,
        source_id = rule.scope.source_id().unwrap_or("*"),
        "threshold rule created"
    );
    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn update_threshold(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
    body: Result<Json<ThresholdPatch>, JsonRejection>,
) -> Result<Json<ThresholdRule>, ApiError> {
    let Json(patch) = body?;
    let rule = state.thresholds.update(&rule_id, patch).await?;
    state.metrics.inc_threshold_changes();
    tracing::info!(
        rule_id = %rule.id,
        warning = rule.warning_value,
        critical = rule.critical_value,
        enabled = rule.enabled,
        "threshold rule updated"
    );
    Ok(Json(rule))
}

pub async fn delete_threshold(
    State(state): State<AppState>,
    Path(rule_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.thresholds.delete(&rule_id).await?;
    state.metrics.inc_threshold_changes();
    tracing::info!(rule_id = %rule_id, "threshold rule deleted");
    Ok(StatusCode::NO_CONTENT)
}
