use thiserror::Error;

/// Failure reported by a query or mutation capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Entity not found")]
    NotFound,

    #[error("Access denied")]
    Unauthorized,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type QueryError = RemoteError;
pub type MutationError = RemoteError;

pub type QueryResult<T> = Result<T, QueryError>;
pub type MutationResult<T> = Result<T, MutationError>;

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::ValidationError(format!("Malformed payload: {err}"))
    }
}
