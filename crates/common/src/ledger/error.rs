#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    NotFound(String),
    InvalidInput(String),
    AlreadyAcknowledged(String),
    AlreadyResolved(String),
    Unavailable(String),
    // Refused statement or undecodable row; retrying fails the same way.
    Storage(String),
}

impl LedgerError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyAcknowledged(_) | Self::AlreadyResolved(_))
    }
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "alert '{id}' not found"),
            Self::InvalidInput(msg) => write!(f, "invalid alert: {msg}"),
            Self::AlreadyAcknowledged(id) => write!(f, "alert '{id}' is already acknowledged"),
            Self::AlreadyResolved(id) => write!(f, "alert '{id}' is resolved"),
            Self::Unavailable(msg) => write!(f, "alert storage unavailable: {msg}"),
            Self::Storage(msg) => write!(f, "alert storage rejected the operation: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(_)
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::TypeNotFound { .. } => Self::Storage(e.to_string()),
            other => Self::Unavailable(other.to_string()),
        }
    }
}
