use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use serde_json::json;

use crate::errors::AppError;
use crate::session::gate;
use crate::session::resolver::SessionState;
use crate::state::AppState;

/// POST /images — authenticated multipart upload, field name "image".
/// Proxies to the external image host and returns `{url}`.
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    gate::require_user(&session)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read image field: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::Validation("image file is empty".to_string()));
        }

        let url = state
            .images
            .upload(&filename, bytes)
            .await
            .map_err(|e| AppError::ImageHost(e.to_string()))?;
        return Ok(Json(json!({ "url": url })));
    }

    Err(AppError::Validation("missing 'image' field".to_string()))
}
