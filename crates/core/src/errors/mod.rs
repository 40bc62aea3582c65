//! Error types and Result alias for the progression engine

use thiserror::Error;

/// Main error type for the progression engine
#[derive(Error, Debug)]
pub enum Error {
    /// Operating on a gift (or record) that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation not allowed in the current state (claiming a locked gift,
    /// claiming a streak twice in one day, overlapping generation requests)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Reward generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// Remote or local store load/save failed
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Session token expired")]
    TokenExpired,

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error came from the storage side (remote store,
    /// transport, or local database)
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Error::PersistenceFailure(_)
                | Error::NetworkError(_)
                | Error::ApiError(_)
                | Error::DatabaseError(_)
                | Error::TokenExpired
                | Error::AuthenticationError(_)
        )
    }

    /// Collapse storage-side errors into `PersistenceFailure`, leaving
    /// `NotFound` / `InvalidState` and friends untouched.
    pub fn into_persistence(self) -> Self {
        match self {
            Error::PersistenceFailure(_) => self,
            e if e.is_persistence() => Error::PersistenceFailure(e.to_string()),
            e => e,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_become_persistence_failures() {
        let err = Error::NetworkError("connection reset".to_string()).into_persistence();
        assert!(matches!(err, Error::PersistenceFailure(msg) if msg.contains("connection reset")));
    }

    #[test]
    fn test_domain_errors_pass_through() {
        let err = Error::NotFound("gift abc".to_string()).into_persistence();
        assert!(matches!(err, Error::NotFound(_)));

        let err = Error::InvalidState("locked".to_string()).into_persistence();
        assert!(matches!(err, Error::InvalidState(_)));
    }
}
