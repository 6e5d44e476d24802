use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A publisher. Articles reference publishers by name (soft reference — no
/// foreign key, no cascading delete).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Publisher {
    pub id: Uuid,
    pub name: String,
    pub logo_url: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /publishers`.
#[derive(Debug, Deserialize)]
pub struct CreatePublisherRequest {
    pub name: String,
    pub logo_url: String,
}
