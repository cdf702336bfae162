use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Errors returned by the relay endpoints.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The relay body could not be read as a JSON object.
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// The planning agent could not be reached or answered non-2xx.
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::MalformedBody(reason) => {
                tracing::error!("Swapping agent request body unreadable: {reason}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process swapping agent request".into(),
                )
            }
            AppError::Upstream(e) => {
                tracing::error!("Swapping agent request failed: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process swapping agent request".into(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
