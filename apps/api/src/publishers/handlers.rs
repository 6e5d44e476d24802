use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::publisher::{CreatePublisherRequest, Publisher};
use crate::session::gate;
use crate::session::resolver::SessionState;
use crate::state::AppState;

/// GET /publishers
pub async fn list_publishers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Publisher>>, AppError> {
    let publishers: Vec<Publisher> =
        sqlx::query_as("SELECT * FROM publishers ORDER BY name ASC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(publishers))
}

/// POST /publishers — admin only. Publisher names are unique because
/// articles reference them by name.
pub async fn create_publisher(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Json(req): Json<CreatePublisherRequest>,
) -> Result<(StatusCode, Json<Publisher>), AppError> {
    let admin = gate::require_admin(&session)?;

    if req.name.trim().is_empty() {
        return Err(AppError::Validation("publisher name is required".to_string()));
    }
    if req.logo_url.trim().is_empty() {
        return Err(AppError::Validation("publisher logo is required".to_string()));
    }

    let existing: Option<Publisher> = sqlx::query_as("SELECT * FROM publishers WHERE name = $1")
        .bind(&req.name)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "publisher '{}' already exists",
            req.name
        )));
    }

    let publisher: Publisher = sqlx::query_as(
        "INSERT INTO publishers (id, name, logo_url) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&req.name)
    .bind(&req.logo_url)
    .fetch_one(&state.db)
    .await?;

    info!("publisher '{}' created by {}", publisher.name, admin.email);
    Ok((StatusCode::CREATED, Json(publisher)))
}
