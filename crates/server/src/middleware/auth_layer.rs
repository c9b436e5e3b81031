use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use fleetwatch_common::clock::now_ms;

use crate::auth::{validate_token, Claims, TokenError};
use crate::rest::error::ApiError;
use crate::rest::AppState;

#[derive(Debug, Clone, PartialEq)]
pub enum Caller {
    Anonymous,
    Token(Claims),
}

impl Caller {
    pub fn actor(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Token(claims) => Some(claims.sub.as_str()),
        }
    }

    pub fn can_delete(&self) -> bool {
        match self {
            Self::Anonymous => true,
            Self::Token(claims) => claims.is_admin(),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = match state.jwt_secret.as_deref() {
        None => Caller::Anonymous,
        Some(secret) => {
            let claims = bearer_token(request.headers())
                .ok_or(TokenError::Missing)
                .and_then(|token| validate_token(secret, token, now_ms() / 1000));
            match claims {
                Ok(claims) => Caller::Token(claims),
                Err(e) => {
                    state.metrics.inc_auth_failures();
                    tracing::warn!(error = %e, path = %request.uri().path(), "rejected request");
                    return Err(e.into());
                }
            }
        }
    };

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}
