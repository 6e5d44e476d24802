use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::articles::moderation::ModerationState;
use crate::models::article::{Article, SubmitArticleRequest};

/// Resolved listing criteria — built by the handler after authorization
/// checks, so the query layer never sees an unvetted filter.
#[derive(Debug, Default)]
pub struct ListCriteria {
    pub search: Option<String>,
    pub publisher: Option<String>,
    pub status: Option<ModerationState>,
    pub author_email: Option<String>,
    pub premium: Option<bool>,
}

pub async fn list(db: &PgPool, criteria: &ListCriteria) -> Result<Vec<Article>, sqlx::Error> {
    let mut query = QueryBuilder::new("SELECT * FROM articles WHERE 1=1");

    if let Some(search) = &criteria.search {
        query.push(" AND title ILIKE ");
        query.push_bind(format!("%{search}%"));
    }
    if let Some(publisher) = &criteria.publisher {
        query.push(" AND publisher = ");
        query.push_bind(publisher.clone());
    }
    if let Some(status) = criteria.status {
        query.push(" AND status = ");
        query.push_bind(status.as_str());
    }
    if let Some(email) = &criteria.author_email {
        query.push(" AND author_email = ");
        query.push_bind(email.clone());
    }
    if let Some(premium) = criteria.premium {
        query.push(" AND premium = ");
        query.push_bind(premium);
    }

    query.push(" ORDER BY posted_at DESC");
    query.build_query_as::<Article>().fetch_all(db).await
}

pub async fn get(db: &PgPool, id: Uuid) -> Result<Option<Article>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM articles WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Inserts a submission. Every new article enters moderation as pending with
/// the premium flag off, regardless of what the author sent.
pub async fn insert(
    db: &PgPool,
    author_email: &str,
    req: &SubmitArticleRequest,
) -> Result<Article, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO articles (id, title, body, image_url, publisher, author_email, tags, status, premium)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', false)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&req.title)
    .bind(&req.body)
    .bind(&req.image_url)
    .bind(&req.publisher)
    .bind(author_email)
    .bind(&req.tags)
    .fetch_one(db)
    .await
}

/// Single-statement increment keeps the counter monotonic under concurrent
/// detail-page loads.
pub async fn increment_views(db: &PgPool, id: Uuid) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("UPDATE articles SET views = views + 1 WHERE id = $1 RETURNING views")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn set_status(
    db: &PgPool,
    id: Uuid,
    status: ModerationState,
    decline_reason: Option<&str>,
) -> Result<Article, sqlx::Error> {
    sqlx::query_as(
        "UPDATE articles SET status = $2, decline_reason = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status.as_str())
    .bind(decline_reason)
    .fetch_one(db)
    .await
}

pub async fn set_premium(db: &PgPool, id: Uuid) -> Result<Article, sqlx::Error> {
    sqlx::query_as("UPDATE articles SET premium = true WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_one(db)
        .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("DELETE FROM articles WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(db)
        .await
}
