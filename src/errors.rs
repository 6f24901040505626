use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the menu and product services.
#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown user, meal or product identifier.
    #[error("{what} '{id}' not found")]
    NotFound { what: &'static str, id: String },

    /// No schedule entry is dated today, even after rescheduling.
    #[error("no eligible meal today")]
    InvalidSchedule,

    #[error("invalid field '{field}': {message}")]
    Validation { field: &'static str, message: String },

    /// Store or availability-service failure, tagged with the operation and identifier.
    #[error("{op} failed for '{id}': {source:#}")]
    Io {
        op: &'static str,
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("request cancelled")]
    Cancelled,
}

impl AppError {
    pub fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            id: id.into(),
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn io(op: &'static str, id: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Io {
            op,
            id: id.into(),
            source: source.into(),
        }
    }

    /// Re-tags an `Io` error with the identifier the caller was working on.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        match self {
            Self::Io { op, source, .. } => Self::Io {
                op,
                id: id.into(),
                source,
            },
            other => other,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InvalidSchedule => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            // nginx convention for "client closed request"
            AppError::Cancelled => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::SERVICE_UNAVAILABLE)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, %status, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
