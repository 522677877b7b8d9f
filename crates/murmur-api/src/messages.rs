use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::warn;

use murmur_store::NewMessage;
use murmur_types::api::{ChannelQuery, MessagesResponse, PostMessageRequest, PostMessageResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/messages?channel=: the channel's retained messages, oldest first.
///
/// Clients poll this every couple of seconds, so it only clones under the
/// channel lock and never fails: unknown channels are simply empty.
pub async fn get_messages(
    State(state): State<AppState>,
    Query(query): Query<ChannelQuery>,
) -> Json<MessagesResponse> {
    Json(MessagesResponse {
        messages: state.store.messages(query.channel_or_default()),
    })
}

/// POST /api/messages: store a text or attachment message.
pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<PostMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let channel_id = req.channel_id.unwrap_or_default();
    let new = NewMessage {
        username: req.username.unwrap_or_default(),
        content: req.content.unwrap_or_default(),
        id: req.id,
        timestamp: req.timestamp,
        reactions: req.reactions,
        file_url: req.file_url,
        file_name: req.file_name,
        file_type: req.file_type,
        file_size: req.file_size,
    };

    let message = state.store.post_message(&channel_id, new).map_err(|e| {
        warn!("Rejected message for channel '{}': {}", channel_id, e);
        ApiError::from(e)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(PostMessageResponse {
            success: true,
            message_id: message.id.clone(),
            message,
        }),
    ))
}
