use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::DateTime;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{Role, UpdateUserRequest, UserRecord};
use crate::session::{cache, gate};
use crate::session::resolver::SessionState;
use crate::state::AppState;

/// GET /users — admin only.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
) -> Result<Json<Vec<UserRecord>>, AppError> {
    gate::require_admin(&session)?;
    let users: Vec<UserRecord> = sqlx::query_as("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(users))
}

/// GET /users/:email — the caller's own record, or any record for an admin.
pub async fn get_user(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Path(email): Path<String>,
) -> Result<Json<UserRecord>, AppError> {
    authorize_self_or_admin(&session, &email)?;

    let user: Option<UserRecord> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or_else(|| AppError::NotFound(format!("User {email} not found")))?;
    Ok(Json(user))
}

/// PATCH /users/:email — profile fields, and the premium expiry written by
/// the subscription flow after a confirmed payment. Setting an expiry
/// promotes role user → premium; it never touches an admin.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Path(email): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserRecord>, AppError> {
    authorize_self_or_admin(&session, &email)?;

    if let Some(raw) = &req.premium_expiry {
        // Reject malformed expiries at the boundary; a bad value stored here
        // would silently deny the subscription it was meant to grant.
        DateTime::parse_from_rfc3339(raw).map_err(|_| {
            AppError::Validation(format!("premium_expiry '{raw}' is not an RFC 3339 timestamp"))
        })?;
    }

    let updated: Option<UserRecord> = sqlx::query_as(
        r#"
        UPDATE users SET
            name = COALESCE($2, name),
            photo_url = COALESCE($3, photo_url),
            premium_expiry = COALESCE($4, premium_expiry),
            role = CASE WHEN $4 IS NOT NULL AND role <> 'admin' THEN 'premium' ELSE role END
        WHERE email = $1
        RETURNING *
        "#,
    )
    .bind(&email)
    .bind(&req.name)
    .bind(&req.photo_url)
    .bind(&req.premium_expiry)
    .fetch_optional(&state.db)
    .await?;
    let updated = updated.ok_or_else(|| AppError::NotFound(format!("User {email} not found")))?;

    cache::invalidate(&state.redis, &email).await;
    Ok(Json(updated))
}

/// PATCH /users/admin/:id — admin promotes the target to admin. Admin
/// supersedes premium, so the expiry is cleared.
pub async fn make_admin(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserRecord>, AppError> {
    let admin = gate::require_admin(&session)?;

    let updated: Option<UserRecord> = sqlx::query_as(
        "UPDATE users SET role = $2, premium_expiry = NULL WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(Role::Admin.as_str())
    .fetch_optional(&state.db)
    .await?;
    let updated = updated.ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    cache::invalidate(&state.redis, &updated.email).await;
    info!("user {} promoted to admin by {}", updated.email, admin.email);
    Ok(Json(updated))
}

/// DELETE /users/:id — admin only. The path parameter shares its segment
/// with `/users/:email`, so the id is parsed out of the raw string here.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let admin = gate::require_admin(&session)?;
    let id = Uuid::parse_str(&raw_id)
        .map_err(|_| AppError::Validation(format!("'{raw_id}' is not a user id")))?;

    let deleted: Option<String> = sqlx::query_scalar("DELETE FROM users WHERE id = $1 RETURNING email")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;
    let email = deleted.ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    cache::invalidate(&state.redis, &email).await;
    info!("user {email} deleted by {}", admin.email);
    Ok(StatusCode::NO_CONTENT)
}

fn authorize_self_or_admin(session: &SessionState, email: &str) -> Result<(), AppError> {
    let user = gate::require_user(session)?;
    if user.is_admin() || user.email == email {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_session(email: &str, role: &str) -> SessionState {
        SessionState::Resolved(UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: "Someone".to_string(),
            photo_url: None,
            role: role.to_string(),
            premium_expiry: None,
            created_at: Utc::now(),
        })
    }

    #[test]
    fn test_self_access_is_allowed() {
        let session = make_session("me@example.com", "user");
        assert!(authorize_self_or_admin(&session, "me@example.com").is_ok());
    }

    #[test]
    fn test_other_user_is_forbidden() {
        let session = make_session("me@example.com", "user");
        let err = authorize_self_or_admin(&session, "other@example.com").unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[test]
    fn test_admin_may_access_anyone() {
        let session = make_session("admin@example.com", "admin");
        assert!(authorize_self_or_admin(&session, "other@example.com").is_ok());
    }

    #[test]
    fn test_anonymous_is_unauthorized() {
        let err = authorize_self_or_admin(&SessionState::Anonymous, "me@example.com").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
}
