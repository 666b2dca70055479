use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub const NOT_FOUND_MESSAGE: &str = "article not found";
pub const INVALID_ID_MESSAGE: &str = "invalid ID format; must be a positive integer";
pub const INTERNAL_MESSAGE: &str = "internal server error";

/// An error on its way out to the client as `{"error": message}`.
#[derive(Error, Debug)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

// Store failures are reported with a generic message; the detail stays in the logs.
impl From<articles_core::Error> for ApiError {
    fn from(err: articles_core::Error) -> Self {
        use articles_core::Error;

        match err {
            Error::Validation(message) => Self::bad_request(message),
            Error::NotFound(_) => Self::new(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
            Error::Storage(_) | Error::Config(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
            }
        }
    }
}

// Every body problem is a plain 400 regardless of which rejection axum produced.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
