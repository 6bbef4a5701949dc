//! Error types for pickup-dash
//!
//! Every error renders as JSON with an `error` message. Errors that carry an
//! upstream or storage cause also carry `details`, and upstream failures
//! relay the ML service's HTTP status when it answered.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::ml::MlError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),

    /// Storage failure (500)
    #[error(transparent)]
    Common(#[from] pickup_common::Error),

    /// ML service call failed (upstream status, else 500)
    #[error("{context}: {source}")]
    Upstream {
        context: &'static str,
        #[source]
        source: MlError,
    },

    /// Storage failure inside a named operation (500, with details)
    #[error("{context}: {source}")]
    Operation {
        context: &'static str,
        #[source]
        source: pickup_common::Error,
    },
}

impl ApiError {
    pub fn upstream(context: &'static str) -> impl FnOnce(MlError) -> Self {
        move |source| ApiError::Upstream { context, source }
    }

    pub fn operation(context: &'static str) -> impl FnOnce(pickup_common::Error) -> Self {
        move |source| ApiError::Operation { context, source }
    }

    /// HTTP status this error renders with
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { source, .. } => source
                .status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Internal(_) | ApiError::Common(_) | ApiError::Operation { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Upstream body as JSON when it parses, else as a plain string
fn upstream_details(source: &MlError) -> Value {
    match source {
        MlError::Upstream { body, .. } => {
            serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.clone()))
        }
        other => Value::String(other.to_string()),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            ApiError::Upstream { context, source } => json!({
                "error": context,
                "details": upstream_details(source),
            }),
            ApiError::Operation { context, source } => json!({
                "error": context,
                "details": source.to_string(),
            }),
            other => json!({ "error": other.to_string() }),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
