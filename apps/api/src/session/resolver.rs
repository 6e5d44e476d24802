use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::models::user::{Role, UserRecord};
use crate::session::cache;
use crate::session::verifier::IdentityClaims;
use crate::state::AppState;

/// Outcome of session resolution for one request.
///
/// There is no "still loading" value: the resolver middleware awaits
/// completion before any handler or gate runs, so downstream code only ever
/// observes one of these resolved variants.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// No usable identity — no token, or a token that failed verification.
    Anonymous,
    /// Verified identity with its server-side user record.
    Resolved(UserRecord),
    /// Verified identity whose record could not be fetched. The gate treats
    /// this the same as Anonymous (fail closed), never as a crash.
    Failed,
}

impl SessionState {
    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            SessionState::Resolved(user) => Some(user),
            SessionState::Anonymous | SessionState::Failed => None,
        }
    }
}

/// Middleware: resolves the session for every request and stores it in
/// request extensions for handlers and gates downstream.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match bearer_token(request.headers()) {
        None => SessionState::Anonymous,
        Some(token) => match state.verifier.verify(token).await {
            // An invalid or expired token is indistinguishable from being
            // signed out.
            None => SessionState::Anonymous,
            Some(claims) => lookup(&state, &claims).await,
        },
    };

    request.extensions_mut().insert(session);
    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Cache-first record lookup, keyed by the verified email claim.
async fn lookup(state: &AppState, claims: &IdentityClaims) -> SessionState {
    if let Some(user) = cache::get(&state.redis, &claims.email).await {
        return SessionState::Resolved(user);
    }

    match fetch_or_create(&state.db, claims).await {
        Ok(user) => {
            cache::put(&state.redis, &user).await;
            SessionState::Resolved(user)
        }
        Err(e) => {
            warn!("session resolution failed for {}: {e}", claims.email);
            SessionState::Failed
        }
    }
}

/// Fetches the record for a verified identity, materializing a default one on
/// first resolution (mirrors sign-up: every identity gets a record with role
/// "user").
async fn fetch_or_create(db: &PgPool, claims: &IdentityClaims) -> Result<UserRecord, sqlx::Error> {
    let existing: Option<UserRecord> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&claims.email)
        .fetch_optional(db)
        .await?;
    if let Some(user) = existing {
        return Ok(user);
    }

    let name = claims.name.clone().unwrap_or_else(|| claims.email.clone());

    // ON CONFLICT covers two first-resolution requests racing for the same
    // identity; whichever inserts, both observe the same row.
    let created: UserRecord = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&claims.email)
    .bind(&name)
    .bind(Role::User.as_str())
    .fetch_one(db)
    .await?;

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header_yields_none() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_non_bearer_scheme_yields_none() {
        let headers = headers_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_session_state_user_accessor() {
        assert!(SessionState::Anonymous.user().is_none());
        assert!(SessionState::Failed.user().is_none());
    }
}
