pub mod error;
pub mod files;
pub mod messages;
pub mod reactions;
pub mod state;
pub mod uploads;
pub mod users;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::services::ServeDir;

use crate::state::AppState;
use crate::uploads::PUBLIC_PREFIX;

/// All chat routes, with state applied. Cross-cutting layers (CORS, tracing)
/// are added by the binary.
pub fn router(state: AppState) -> Router {
    let uploads_dir = state.uploads.dir().to_path_buf();
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/api/messages", get(messages::get_messages).post(messages::send_message))
        .route("/api/reactions", get(reactions::reaction_summary).post(reactions::toggle_reaction))
        .route("/api/users", get(users::roster).post(users::heartbeat))
        .route("/api/upload", post(files::upload_file))
        .route("/api/download/{filename}", get(files::download_file))
        .route("/health", get(health))
        .nest_service(PUBLIC_PREFIX, ServeDir::new(uploads_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
