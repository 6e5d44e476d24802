use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An article row. `status` holds a `ModerationState` as text (see
/// `articles::moderation`); `views` only ever increases.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    /// Soft reference to `publishers.name` — not an enforced foreign key.
    pub publisher: String,
    pub author_email: String,
    pub tags: Vec<String>,
    pub views: i64,
    pub status: String,
    pub decline_reason: Option<String>,
    pub premium: bool,
    pub posted_at: DateTime<Utc>,
}

/// Body of `POST /articles`. Submissions always enter moderation as pending;
/// the premium flag is granted later by an admin, never by the author.
#[derive(Debug, Deserialize)]
pub struct SubmitArticleRequest {
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub publisher: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Query parameters of `GET /articles`.
#[derive(Debug, Default, Deserialize)]
pub struct ArticleFilter {
    /// Case-insensitive title substring match.
    pub search: Option<String>,
    /// Exact publisher name.
    pub publisher: Option<String>,
    /// Moderation status filter — admin only.
    pub status: Option<String>,
    /// Author filter — the caller themselves, or admin.
    pub email: Option<String>,
}

/// Body of `PATCH /articles/decline/:id`.
#[derive(Debug, Deserialize)]
pub struct DeclineRequest {
    pub reason: String,
}
