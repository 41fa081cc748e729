//! Error types for the StayHub cache client
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Error Enum ==
/// Unified error type for the cache, the worker pool and the backend client.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cached or received JSON did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Transport-level failure talking to the backend
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with an error status or `success: false`
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// A worker reported a failure for the given task
    #[error("Task {task_id} failed: {message}")]
    Task { task_id: String, message: String },

    /// The worker pool was terminated before the task completed
    #[error("Worker pool terminated")]
    PoolTerminated,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidRequest(_) | Error::Decode(_) => StatusCode::BAD_REQUEST,
            Error::Http(_) | Error::Backend { .. } => StatusCode::BAD_GATEWAY,
            Error::Task { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::PoolTerminated => StatusCode::SERVICE_UNAVAILABLE,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;
