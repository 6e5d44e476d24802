use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::user::UserRecord;
use crate::session::entitlement::is_entitled;
use crate::session::resolver::SessionState;

/// Fallback targets for denied navigation.
pub(crate) const LOGIN_PATH: &str = "/login";
pub(crate) const HOME_PATH: &str = "/";
pub(crate) const SUBSCRIPTION_PATH: &str = "/subscription";

/// What a gated route requires of the resolved session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePolicy {
    /// Any signed-in identity.
    Authenticated,
    /// Role must be admin.
    AdminOnly,
    /// Premium entitlement must be current. Admins pass.
    PremiumOnly,
}

/// The gate's verdict for one request. Denied is terminal for the attempt:
/// the response redirects to `fallback` carrying the originally requested
/// path, and a fresh navigation starts the decision over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Granted,
    Denied { fallback: &'static str },
}

/// Maps a *resolved* session onto a gate decision. Resolution failures and
/// missing identities deny towards the login page; a present identity that
/// lacks the required role or entitlement denies towards the policy's
/// fallback.
pub fn decide(policy: GatePolicy, session: &SessionState, now: DateTime<Utc>) -> GateDecision {
    let user = match session {
        SessionState::Resolved(user) => user,
        SessionState::Anonymous | SessionState::Failed => {
            return GateDecision::Denied {
                fallback: LOGIN_PATH,
            }
        }
    };

    match policy {
        GatePolicy::Authenticated => GateDecision::Granted,
        GatePolicy::AdminOnly => {
            if user.is_admin() {
                GateDecision::Granted
            } else {
                GateDecision::Denied {
                    fallback: HOME_PATH,
                }
            }
        }
        GatePolicy::PremiumOnly => {
            if user.is_admin() || is_entitled(user, now) {
                GateDecision::Granted
            } else {
                GateDecision::Denied {
                    fallback: SUBSCRIPTION_PATH,
                }
            }
        }
    }
}

/// Builds the denial redirect, attaching the requested path as `from` so the
/// destination can re-navigate after the user signs in or subscribes.
pub fn deny_response(fallback: &'static str, requested_path: &str) -> Response {
    let target = format!("{fallback}?from={}", urlencoding::encode(requested_path));
    Redirect::to(&target).into_response()
}

async fn gate_view(policy: GatePolicy, request: Request, next: Next) -> Response {
    // A missing extension means the resolver never ran for this route; that
    // is a wiring bug, and the gate must deny rather than guess.
    let session = request
        .extensions()
        .get::<SessionState>()
        .cloned()
        .unwrap_or(SessionState::Failed);

    match decide(policy, &session, Utc::now()) {
        GateDecision::Granted => next.run(request).await,
        GateDecision::Denied { fallback } => deny_response(fallback, request.uri().path()),
    }
}

/// Middleware for authenticated-only view routes.
pub async fn view_authenticated(request: Request, next: Next) -> Response {
    gate_view(GatePolicy::Authenticated, request, next).await
}

/// Middleware for admin-only view routes.
pub async fn view_admin(request: Request, next: Next) -> Response {
    gate_view(GatePolicy::AdminOnly, request, next).await
}

/// Middleware for premium view routes.
pub async fn view_premium(request: Request, next: Next) -> Response {
    gate_view(GatePolicy::PremiumOnly, request, next).await
}

/// Handler-level guard for mutating API routes: 401 instead of a redirect.
pub fn require_user(session: &SessionState) -> Result<&UserRecord, AppError> {
    session.user().ok_or(AppError::Unauthorized)
}

/// Handler-level guard for admin API routes: 401 when signed out, 403 when
/// signed in without the role.
pub fn require_admin(session: &SessionState) -> Result<&UserRecord, AppError> {
    let user = require_user(session)?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::LOCATION, StatusCode};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn make_user(role: &str, premium_expiry: Option<&str>) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            email: "reader@example.com".to_string(),
            name: "Reader".to_string(),
            photo_url: None,
            role: role.to_string(),
            premium_expiry: premium_expiry.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_anonymous_denied_towards_login_for_every_policy() {
        for policy in [
            GatePolicy::Authenticated,
            GatePolicy::AdminOnly,
            GatePolicy::PremiumOnly,
        ] {
            assert_eq!(
                decide(policy, &SessionState::Anonymous, now()),
                GateDecision::Denied { fallback: "/login" }
            );
        }
    }

    #[test]
    fn test_failed_resolution_denies_like_anonymous() {
        assert_eq!(
            decide(GatePolicy::Authenticated, &SessionState::Failed, now()),
            GateDecision::Denied { fallback: "/login" }
        );
    }

    #[test]
    fn test_resolved_identity_passes_authenticated_gate() {
        let session = SessionState::Resolved(make_user("user", None));
        assert_eq!(
            decide(GatePolicy::Authenticated, &session, now()),
            GateDecision::Granted
        );
    }

    #[test]
    fn test_non_admin_identity_denied_towards_home() {
        let session = SessionState::Resolved(make_user("premium", Some("2099-01-01T00:00:00Z")));
        assert_eq!(
            decide(GatePolicy::AdminOnly, &session, now()),
            GateDecision::Denied { fallback: "/" }
        );
    }

    #[test]
    fn test_admin_passes_admin_gate() {
        let session = SessionState::Resolved(make_user("admin", None));
        assert_eq!(
            decide(GatePolicy::AdminOnly, &session, now()),
            GateDecision::Granted
        );
    }

    #[test]
    fn test_entitled_user_passes_premium_gate() {
        let session = SessionState::Resolved(make_user("premium", Some("2099-01-01T00:00:00Z")));
        assert_eq!(
            decide(GatePolicy::PremiumOnly, &session, now()),
            GateDecision::Granted
        );
    }

    #[test]
    fn test_lapsed_user_denied_towards_subscription() {
        let session = SessionState::Resolved(make_user("premium", Some("2020-01-01T00:00:00Z")));
        assert_eq!(
            decide(GatePolicy::PremiumOnly, &session, now()),
            GateDecision::Denied {
                fallback: "/subscription"
            }
        );
    }

    #[test]
    fn test_admin_passes_premium_gate_without_entitlement() {
        let session = SessionState::Resolved(make_user("admin", None));
        assert_eq!(
            decide(GatePolicy::PremiumOnly, &session, now()),
            GateDecision::Granted
        );
    }

    #[test]
    fn test_deny_response_preserves_requested_path() {
        let response = deny_response("/login", "/my-articles");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/login?from=%2Fmy-articles"
        );
    }

    #[test]
    fn test_require_user_rejects_anonymous_with_401() {
        let err = require_user(&SessionState::Anonymous).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_require_admin_rejects_plain_user_with_403() {
        let session = SessionState::Resolved(make_user("user", None));
        let err = require_admin(&session).unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[test]
    fn test_require_admin_accepts_admin() {
        let session = SessionState::Resolved(make_user("admin", None));
        assert!(require_admin(&session).is_ok());
    }
}
