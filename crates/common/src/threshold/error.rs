#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdError {
    NotFound(String),
    InvalidInput(String),
    Conflict(String),
    Unavailable(String),
}

impl std::fmt::Display for ThresholdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "threshold rule '{id}' not found"),
            Self::InvalidInput(msg) => write!(f, "invalid threshold rule: {msg}"),
            Self::Conflict(msg) => write!(f, "conflict: {msg}"),
            Self::Unavailable(msg) => write!(f, "threshold storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for ThresholdError {}

impl From<sqlx::Error> for ThresholdError {
    fn from(e: sqlx::Error) -> Self {
        if crate::db::is_unique_violation(&e) {
            return Self::Conflict("a rule for this metric and scope already exists".into());
        }
        Self::Unavailable(e.to_string())
    }
}
