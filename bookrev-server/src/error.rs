//! Mapping of library errors onto HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bookrev_core::{BookrevError, ValidationError};
use serde_json::json;

/// Error returned by handlers, rendered as `{ "error": "..." }`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<BookrevError> for ApiError {
    fn from(err: BookrevError) -> Self {
        let status = match &err {
            BookrevError::NotFound(_) => StatusCode::NOT_FOUND,
            BookrevError::Validation(ValidationError::PasswordMismatch) => StatusCode::FORBIDDEN,
            BookrevError::Validation(_) => StatusCode::BAD_REQUEST,
            BookrevError::Remote(_) => StatusCode::BAD_GATEWAY,
            BookrevError::Storage(_) | BookrevError::Serde(_) => {
                tracing::error!("Request failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookrev_core::RemoteFetchError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (BookrevError::NotFound("book x".into()), StatusCode::NOT_FOUND),
            (
                ValidationError::PasswordMismatch.into(),
                StatusCode::FORBIDDEN,
            ),
            (
                ValidationError::InvalidRating(0).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                RemoteFetchError::Transport("refused".into()).into(),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }
}
