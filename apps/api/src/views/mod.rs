//! Gated view routes.
//!
//! Thin reads backing the protected pages. The route gate middleware in
//! front of each of these (wired in `routes`) has already granted access by
//! the time a handler runs; handlers still re-check the session instead of
//! assuming it, so a mis-wired route fails closed.

use axum::{extract::State, Extension, Json};

use crate::articles::moderation::ModerationState;
use crate::articles::queries::{self, ListCriteria};
use crate::errors::AppError;
use crate::models::article::Article;
use crate::models::user::UserRecord;
use crate::session::gate;
use crate::session::resolver::SessionState;
use crate::state::AppState;

/// GET /my-articles — the caller's own submissions, every moderation state.
pub async fn my_articles(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
) -> Result<Json<Vec<Article>>, AppError> {
    let user = gate::require_user(&session)?;
    let criteria = ListCriteria {
        author_email: Some(user.email.clone()),
        ..Default::default()
    };
    Ok(Json(queries::list(&state.db, &criteria).await?))
}

/// GET /premium — the approved premium feed.
pub async fn premium_feed(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
) -> Result<Json<Vec<Article>>, AppError> {
    let granted = gate::decide(gate::GatePolicy::PremiumOnly, &session, chrono::Utc::now())
        == gate::GateDecision::Granted;
    if !granted {
        return Err(AppError::Forbidden);
    }

    let criteria = ListCriteria {
        status: Some(ModerationState::Approved),
        premium: Some(true),
        ..Default::default()
    };
    Ok(Json(queries::list(&state.db, &criteria).await?))
}

/// GET /dashboard/articles — the moderation queue: every submission in every
/// state.
pub async fn dashboard_articles(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
) -> Result<Json<Vec<Article>>, AppError> {
    gate::require_admin(&session)?;
    Ok(Json(queries::list(&state.db, &ListCriteria::default()).await?))
}

/// GET /dashboard/users — every user record.
pub async fn dashboard_users(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
) -> Result<Json<Vec<UserRecord>>, AppError> {
    gate::require_admin(&session)?;
    let users: Vec<UserRecord> = sqlx::query_as("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(users))
}
