use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use tracing::debug;

use murmur_types::api::{ChannelQuery, HeartbeatRequest, HeartbeatResponse, RosterResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/users: presence heartbeat. Refreshes the caller, sweeps idle
/// users and returns who is left.
pub async fn heartbeat(
    State(state): State<AppState>,
    payload: Result<Json<HeartbeatRequest>, JsonRejection>,
) -> Result<Json<HeartbeatResponse>, ApiError> {
    let Json(req) = payload?;

    let channel_id = req.channel_id.unwrap_or_default();
    let username = req.username.unwrap_or_default();
    let is_typing = req.is_typing.unwrap_or(false);

    let users = state.store.heartbeat(&channel_id, &username, is_typing)?;
    debug!("Heartbeat from {} in {}: {} user(s) present", username, channel_id, users.len());

    Ok(Json(HeartbeatResponse { users }))
}

/// GET /api/users?channel=: roster with online flags, without touching state.
pub async fn roster(
    State(state): State<AppState>,
    Query(query): Query<ChannelQuery>,
) -> Json<RosterResponse> {
    let channel_id = query.channel_or_default().to_string();
    let users = state.store.roster(&channel_id);

    Json(RosterResponse {
        channel_id,
        user_count: users.len(),
        users,
    })
}
