use axum::{
    Json,
    extract::{
        Multipart, Path, State,
        multipart::{Field, MultipartRejection},
    },
    http::header,
    response::IntoResponse,
};
use tracing::{error, info};

use murmur_types::api::UploadResponse;

use crate::error::ApiError;
use crate::state::AppState;
use crate::uploads::{content_type_for, is_stored_name};

/// POST /api/upload: multipart form with a `file` field (plus optional
/// `channelId` / `username`, used for logging only).
///
/// Returns the `fileUrl` the client then attaches to a posted message.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut file_name = None;
    let mut content_type = None;
    let mut data = None;
    let mut channel_id = String::new();
    let mut username = String::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart field: {}", e);
        ApiError::BadRequest(e.body_text())
    })? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                content_type = field.content_type().map(|s| s.to_string());
                data = Some(field.bytes().await.map_err(|e| {
                    error!("Failed to read file data: {}", e);
                    ApiError::BadRequest(e.body_text())
                })?);
            }
            "channelId" => channel_id = read_text(&name, field).await?,
            "username" => username = read_text(&name, field).await?,
            _ => {}
        }
    }

    let data = data.ok_or_else(|| ApiError::BadRequest("No file uploaded".into()))?;
    let original_name = file_name.unwrap_or_else(|| "file".to_string());
    let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());

    let stored = state
        .uploads
        .save(&original_name, &data)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to store upload: {}", e)))?;

    info!(
        "Upload {} from {} for channel {}",
        stored.file_name,
        if username.is_empty() { "<anonymous>" } else { username.as_str() },
        if channel_id.is_empty() { "<none>" } else { channel_id.as_str() },
    );

    Ok(Json(UploadResponse {
        success: true,
        file_url: stored.url,
        filename: stored.file_name,
        original_name,
        size: stored.size,
        content_type,
    }))
}

async fn read_text(name: &str, field: Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(|e| {
        error!("Failed to read multipart field {}: {}", name, e);
        ApiError::BadRequest(e.body_text())
    })
}

/// GET /api/download/{filename}: the stored bytes as an attachment.
pub async fn download_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_stored_name(&file_name) {
        return Err(ApiError::BadRequest("Invalid file name".into()));
    }

    let bytes = state
        .uploads
        .read(&file_name)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to read {}: {}", file_name, e)))?
        .ok_or_else(|| ApiError::NotFound("File not found".into()))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&file_name).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
            (header::CACHE_CONTROL, "public, max-age=31536000".to_string()),
        ],
        bytes,
    ))
}
