//! Handler-level error mapping.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::core::SpeechError;

pub type AppResult<T> = Result<T, AppError>;

/// Error returned by HTTP handlers before a response body has been started.
///
/// An upstream failure surfaces the upstream's own status code to the client
/// rather than collapsing into a generic 500. Errors mid-stream never reach
/// this type; they abort the already-started body instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("upstream request failed with status {status}")]
    Upstream { status: StatusCode },

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SpeechError> for AppError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::UpstreamStatus(status) => AppError::Upstream { status },
            SpeechError::Transport(_) => AppError::Upstream {
                status: StatusCode::BAD_GATEWAY,
            },
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Upstream { status } => status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!(%status, error = %self, "Request failed");
        let body = Json(json!({
            "error": { "message": self.to_string() }
        }));
        (status, body).into_response()
    }
}
