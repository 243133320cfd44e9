//! Typed errors and HTTP mapping.

use crate::response::error_body;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Wiring-time errors: endpoint tree, model build, view configuration. These abort startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("endpoint not found: '{segment}' is not registered under '{parent}'")]
    EndpointNotFound { segment: String, parent: String },
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: &'static str },
    #[error("model {model} has no primary key column")]
    PrimaryKeyMissing { model: String },
    #[error("model {model} declares a composite primary key ({columns}); only single-column keys are supported")]
    CompositePrimaryKey { model: String, columns: String },
    #[error("model {model} declares column '{column}' more than once")]
    DuplicateColumn { model: String, column: String },
    #[error("missing reference: {kind} '{id}'")]
    MissingReference { kind: &'static str, id: String },
    #[error("model mismatch: expected {expected}, got {found}")]
    ModelMismatch { expected: String, found: String },
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("storage: {0}")]
    Storage(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("column '{0}' is not editable")]
    ColumnNotEditable(String),
    #[error("method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    /// Status code and machine-readable code for this error.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::ColumnNotEditable(_) => (StatusCode::BAD_REQUEST, "column_not_editable"),
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed"),
        }
    }

    /// Message safe to show a client. Internal failures are logged and replaced by a generic text.
    pub fn public_message(&self) -> String {
        let (status, code) = self.status();
        if status.is_server_error() {
            tracing::error!(code, error = %self, "internal error");
            "internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        (status, Json(error_body(code, self.public_message()))).into_response()
    }
}
