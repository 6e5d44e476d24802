use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::articles::moderation::{self, ModerationState, Transition};
use crate::articles::queries::{self, ListCriteria};
use crate::errors::AppError;
use crate::models::article::{Article, ArticleFilter, DeclineRequest, SubmitArticleRequest};
use crate::session::entitlement::is_entitled;
use crate::session::gate;
use crate::session::resolver::SessionState;
use crate::state::AppState;

/// GET /articles
///
/// Public callers see approved content. The status filter is admin-only; the
/// email filter is restricted to the author themselves (or an admin) and also
/// reveals unapproved submissions, since it backs the "my articles" view.
pub async fn list_articles(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Query(filter): Query<ArticleFilter>,
) -> Result<Json<Vec<Article>>, AppError> {
    let mut criteria = ListCriteria {
        search: filter.search,
        publisher: filter.publisher,
        ..Default::default()
    };

    if let Some(raw) = &filter.status {
        gate::require_admin(&session)?;
        let status = ModerationState::parse(raw)
            .ok_or_else(|| AppError::Validation(format!("unknown status filter '{raw}'")))?;
        criteria.status = Some(status);
    }

    if let Some(email) = &filter.email {
        let user = gate::require_user(&session)?;
        if !user.is_admin() && user.email != *email {
            return Err(AppError::Forbidden);
        }
        criteria.author_email = Some(email.clone());
    }

    if criteria.status.is_none() && criteria.author_email.is_none() {
        criteria.status = Some(ModerationState::Approved);
    }

    let articles = queries::list(&state.db, &criteria).await?;
    Ok(Json(articles))
}

/// GET /articles/:id
///
/// Does NOT touch the view counter — that is a separate, explicit call.
/// Premium-flagged articles require a current entitlement; denial redirects
/// to the subscription page with the requested path attached.
pub async fn get_article(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let article = queries::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article {id} not found")))?;

    let viewer = session.user();

    // Unapproved submissions exist only for their author and for admins;
    // everyone else gets a 404 rather than a hint that the article exists.
    if ModerationState::parse(&article.status) != Some(ModerationState::Approved) {
        let allowed = viewer
            .map(|u| u.is_admin() || u.email == article.author_email)
            .unwrap_or(false);
        if !allowed {
            return Err(AppError::NotFound(format!("Article {id} not found")));
        }
    }

    if article.premium {
        let entitled = viewer
            .map(|u| u.is_admin() || is_entitled(u, Utc::now()))
            .unwrap_or(false);
        if !entitled {
            return Ok(gate::deny_response(
                gate::SUBSCRIPTION_PATH,
                &format!("/articles/{id}"),
            ));
        }
    }

    Ok(Json(article).into_response())
}

/// POST /articles — authenticated submission; always enters moderation as
/// pending.
pub async fn submit_article(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Json(req): Json<SubmitArticleRequest>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    let user = gate::require_user(&session)?;
    validate_submission(&req)?;

    let article = queries::insert(&state.db, &user.email, &req).await?;
    info!("article {} submitted by {}", article.id, user.email);
    Ok((StatusCode::CREATED, Json(article)))
}

/// PATCH /articles/:id/views — one call, one increment. Anonymous reads
/// count, so this is deliberately ungated.
pub async fn increment_views(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let views = queries::increment_views(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article {id} not found")))?;
    Ok(Json(json!({ "views": views })))
}

/// PATCH /articles/approve/:id — admin. Idempotent on an already-approved
/// article: the current row is returned and no state change is written.
pub async fn approve_article(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Article>, AppError> {
    let admin = gate::require_admin(&session)?;
    let article = fetch_for_moderation(&state, id).await?;
    let current = parse_state(&article)?;

    match moderation::approve(current) {
        Transition::Apply(next) => {
            let updated = queries::set_status(&state.db, id, next, None).await?;
            info!("article {id} approved by {}", admin.email);
            Ok(Json(updated))
        }
        Transition::NoOp => Ok(Json(article)),
        Transition::Invalid(msg) => Err(AppError::Conflict(msg.to_string())),
    }
}

/// PATCH /articles/decline/:id — admin; records the reason.
pub async fn decline_article(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DeclineRequest>,
) -> Result<Json<Article>, AppError> {
    let admin = gate::require_admin(&session)?;
    if req.reason.trim().is_empty() {
        return Err(AppError::Validation("decline reason is required".to_string()));
    }

    let article = fetch_for_moderation(&state, id).await?;
    let current = parse_state(&article)?;

    match moderation::decline(current) {
        Transition::Apply(next) => {
            let updated = queries::set_status(&state.db, id, next, Some(&req.reason)).await?;
            info!("article {id} declined by {}", admin.email);
            Ok(Json(updated))
        }
        Transition::NoOp => Ok(Json(article)),
        Transition::Invalid(msg) => Err(AppError::Conflict(msg.to_string())),
    }
}

/// PATCH /articles/premium/:id — admin; approved articles only.
pub async fn mark_premium(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Article>, AppError> {
    let admin = gate::require_admin(&session)?;
    let article = fetch_for_moderation(&state, id).await?;
    let current = parse_state(&article)?;

    moderation::can_mark_premium(current).map_err(|msg| AppError::Conflict(msg.to_string()))?;
    if article.premium {
        return Ok(Json(article));
    }

    let updated = queries::set_premium(&state.db, id).await?;
    info!("article {id} marked premium by {}", admin.email);
    Ok(Json(updated))
}

/// DELETE /articles/:id — admin, or the submitting author. Terminal.
pub async fn delete_article(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user = gate::require_user(&session)?;
    let article = queries::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article {id} not found")))?;

    if !user.is_admin() && user.email != article.author_email {
        return Err(AppError::Forbidden);
    }

    queries::delete(&state.db, id).await?;
    info!("article {id} deleted by {}", user.email);
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_for_moderation(state: &AppState, id: Uuid) -> Result<Article, AppError> {
    queries::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article {id} not found")))
}

fn parse_state(article: &Article) -> Result<ModerationState, AppError> {
    ModerationState::parse(&article.status).ok_or_else(|| {
        AppError::Conflict(format!(
            "article {} has unrecognized status '{}'",
            article.id, article.status
        ))
    })
}

fn validate_submission(req: &SubmitArticleRequest) -> Result<(), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    if req.body.trim().is_empty() {
        return Err(AppError::Validation("body is required".to_string()));
    }
    if req.publisher.trim().is_empty() {
        return Err(AppError::Validation("publisher is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request(title: &str, body: &str, publisher: &str) -> SubmitArticleRequest {
        SubmitArticleRequest {
            title: title.to_string(),
            body: body.to_string(),
            image_url: None,
            publisher: publisher.to_string(),
            tags: vec![],
        }
    }

    #[test]
    fn test_valid_submission_passes() {
        let req = make_request("Title", "Body text", "The Daily");
        assert!(validate_submission(&req).is_ok());
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        assert!(validate_submission(&make_request("", "body", "p")).is_err());
        assert!(validate_submission(&make_request("title", "   ", "p")).is_err());
        assert!(validate_submission(&make_request("title", "body", "")).is_err());
    }
}
