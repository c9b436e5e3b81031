use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use fleetwatch_common::ledger::LedgerError;
use fleetwatch_common::severity::UnknownSeverity;
use fleetwatch_common::threshold::ThresholdError;
use fleetwatch_common::time_range::InvalidTimeRange;

use crate::auth::TokenError;

pub const RETRY_AFTER_SECS: &str = "5";

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    NotFound(String),
    InvalidInput(String),
    Conflict(String),
    Unavailable(String),
    Unauthorized(String),
    Forbidden(String),
    RateLimited,
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Conflict(_) => "conflict",
            Self::Unavailable(_) => "unavailable",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::RateLimited => "rate_limited",
            Self::Internal(_) => "internal",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::NotFound(m)
            | Self::InvalidInput(m)
            | Self::Conflict(m)
            | Self::Unavailable(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::Internal(m) => m.clone(),
            Self::RateLimited => "too many requests".into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        let body = Json(ErrorBody {
            error: self.kind(),
            message: self.message(),
        });
        match self {
            Self::Unavailable(_) | Self::RateLimited => {
                (status, [(header::RETRY_AFTER, RETRY_AFTER_SECS)], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        let message = e.to_string();
        match e {
            LedgerError::NotFound(_) => Self::NotFound(message),
            LedgerError::InvalidInput(_) => Self::InvalidInput(message),
            LedgerError::AlreadyAcknowledged(_) | LedgerError::AlreadyResolved(_) => Self::Conflict(message),
            LedgerError::Unavailable(_) => Self::Unavailable(message),
            LedgerError::Storage(_) => Self::Internal(message),
        }
    }
}

impl From<ThresholdError> for ApiError {
    fn from(e: ThresholdError) -> Self {
        let message = e.to_string();
        match e {
            ThresholdError::NotFound(_) => Self::NotFound(message),
            ThresholdError::InvalidInput(_) => Self::InvalidInput(message),
            ThresholdError::Conflict(_) => Self::Conflict(message),
            ThresholdError::Unavailable(_) => Self::Unavailable(message),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        Self::Unauthorized(e.to_string())
    }
}

impl From<InvalidTimeRange> for ApiError {
    fn from(e: InvalidTimeRange) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

impl From<UnknownSeverity> for ApiError {
    fn from(e: UnknownSeverity) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::InvalidInput(e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self::InvalidInput(e.body_text())
    }
}
