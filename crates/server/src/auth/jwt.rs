use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use fleetwatch_common::crypto::{sign_url_safe, verify_url_safe};

pub const ADMIN_ROLE: &str = "admin";

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

pub fn create_token(secret: &[u8], claims: &Claims) -> Result<String, TokenError> {
    let header = URL_SAFE_NO_PAD.encode(HEADER);
    let payload = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed)?;
    let unsigned = format!("{header}.{}", URL_SAFE_NO_PAD.encode(payload));
    let sig = sign_url_safe(secret, unsigned.as_bytes());
    Ok(format!("{unsigned}.{sig}"))
}

pub fn validate_token(secret: &[u8], token: &str, now_secs: i64) -> Result<Claims, TokenError> {
    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(sig), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let unsigned = format!("{header}.{payload}");
    if !verify_url_safe(secret, unsigned.as_bytes(), sig) {
        return Err(TokenError::InvalidSignature);
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::Malformed)?;
    let claims: Claims = serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)?;

    if now_secs >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}

#[derive(Debug, PartialEq)]
pub enum TokenError {
    Missing,
    Malformed,
    InvalidSignature,
    Expired,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "missing bearer token"),
            Self::Malformed => write!(f, "malformed token"),
            Self::InvalidSignature => write!(f, "invalid signature"),
            Self::Expired => write!(f, "token expired"),
        }
    }
}

impl std::error::Error for TokenError {}
