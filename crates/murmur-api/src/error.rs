use axum::{
    Json,
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use murmur_store::StoreError;

/// Every failure a handler can report. Serialized as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Carries the ids still in the channel so the client can resync.
    #[error("Message not found")]
    MessageNotFound {
        channel_id: String,
        available_ids: Vec<String>,
    },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::MessageNotFound {
                channel_id,
                available_ids,
            } => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": message,
                    "channelId": channel_id,
                    "availableIds": available_ids,
                })),
            )
                .into_response(),
            ApiError::Conflict(_) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound(_) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(detail) => {
                error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(field) => {
                ApiError::BadRequest(format!("Missing required field: {}", field))
            }
            StoreError::MessageNotFound { channel_id, .. } => ApiError::MessageNotFound {
                channel_id,
                available_ids: Vec::new(),
            },
            StoreError::DuplicateId(id) => {
                ApiError::Conflict(format!("Message id {} already exists", id))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
