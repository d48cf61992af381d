use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::{fmt::Display, panic::Location};
use thiserror::Error;

/// AppError
///
/// The single error type surfaced by the orchestrator and the HTTP handlers.
/// Each variant maps onto exactly one status code; internal failures carry only a
/// generic, client-safe message because their details are logged where they happen.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AppError {
    /// Missing or empty input fields (400).
    #[error("{0}")]
    Validation(String),
    /// Duplicate email (409).
    #[error("{0}")]
    Conflict(String),
    /// Bad credentials or missing role (401).
    #[error("{0}")]
    Unauthorized(String),
    /// Missing entity (404).
    #[error("{0}")]
    NotFound(String),
    /// Hashing, storage, filesystem or query failures (500).
    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// ErrorResponse
///
/// The JSON body returned for every failed request.
#[derive(Debug, Serialize)]
struct ErrorResponse<'a> {
    code: &'static str,
    message: &'a str,
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    /// internal
    ///
    /// Builds a 500 error and logs the underlying cause together with the source
    /// location of the caller. The cause never reaches the client.
    #[track_caller]
    pub fn internal(context: impl Into<String>, cause: impl Display) -> Self {
        let context = context.into();
        let location = Location::caller();
        let at = format!("{}:{}", location.file(), location.line());
        tracing::error!(at = %at, error = %cause, "{context}");
        AppError::Internal(context)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            code: self.code(),
            message: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
