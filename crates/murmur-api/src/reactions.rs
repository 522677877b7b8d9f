use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use tracing::warn;

use murmur_store::StoreError;
use murmur_types::api::{
    ChannelQuery, ReactionDebugEntry, ReactionDebugResponse, ToggleReactionRequest,
    ToggleReactionResponse,
};

use crate::error::ApiError;
use crate::state::AppState;

const PREVIEW_CHARS: usize = 50;

/// POST /api/reactions: toggle one user's emoji on a message.
///
/// The returned mapping is authoritative: clients that applied an optimistic
/// update must replace it with this, and resync the message list on a 404.
pub async fn toggle_reaction(
    State(state): State<AppState>,
    payload: Result<Json<ToggleReactionRequest>, JsonRejection>,
) -> Result<Json<ToggleReactionResponse>, ApiError> {
    let Json(req) = payload?;

    let channel_id = req.channel_id.unwrap_or_default();
    let message_id = req.message_id.unwrap_or_default();
    let emoji = req.emoji.unwrap_or_default();
    let username = req.username.unwrap_or_default();

    match state
        .store
        .toggle_reaction(&channel_id, &message_id, &emoji, &username)
    {
        Ok(outcome) => Ok(Json(ToggleReactionResponse {
            success: true,
            added: outcome.added,
            reactions: outcome.reactions,
        })),
        Err(StoreError::MessageNotFound { channel_id, message_id }) => {
            warn!("Message {} not found in channel {}", message_id, channel_id);
            Err(ApiError::MessageNotFound {
                available_ids: state.store.message_ids(&channel_id),
                channel_id,
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /api/reactions?channel=: compact per-message reaction dump for debugging.
pub async fn reaction_summary(
    State(state): State<AppState>,
    Query(query): Query<ChannelQuery>,
) -> Json<ReactionDebugResponse> {
    let channel_id = query.channel_or_default().to_string();
    let messages: Vec<ReactionDebugEntry> = state
        .store
        .messages(&channel_id)
        .into_iter()
        .map(|m| ReactionDebugEntry {
            id: m.id,
            content: m.content.chars().take(PREVIEW_CHARS).collect(),
            reactions: m.reactions,
        })
        .collect();

    Json(ReactionDebugResponse {
        channel_id,
        message_count: messages.len(),
        messages,
    })
}
