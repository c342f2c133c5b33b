//! Error types for Bookrev Core

use thiserror::Error;

/// Result type alias using BookrevError
pub type Result<T> = std::result::Result<T, BookrevError>;

/// Top-level error type for all Bookrev operations
#[derive(Debug, Error)]
pub enum BookrevError {
    #[error("Remote fetch error: {0}")]
    Remote(#[from] RemoteFetchError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failure talking to the remote catalog
#[derive(Debug, Error)]
pub enum RemoteFetchError {
    /// The request never produced a response (DNS, connect, timeout)
    #[error("request failed: {0}")]
    Transport(String),

    /// Upstream answered with a non-success status
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Upstream answered 2xx but the payload did not decode
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl RemoteFetchError {
    /// Upstream HTTP status, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteFetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Rejected review input or password gate
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Password must be at most {max} characters")]
    PasswordTooLong { max: usize },

    #[error("Password does not match")]
    PasswordMismatch,
}

/// Errors that occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Backend error: {0}")]
    BackendError(String),
}
