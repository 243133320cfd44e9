//! Response helpers: the JSON error envelope and plain-text replies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// `{ "error": { "code", "message" } }`
pub fn error_body(code: &str, message: String) -> ErrorBody {
    ErrorBody {
        error: ErrorDetail {
            code: code.to_string(),
            message,
        },
    }
}

/// `text/plain` response.
pub fn plain_text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, body.into()).into_response()
}
