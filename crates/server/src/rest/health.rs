use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::rest::error::ApiError;
use crate::rest::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

pub async fn ready(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.ledger.ping().await?;
    Ok(StatusCode::OK)
}
