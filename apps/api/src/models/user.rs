use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Access level carried on a user record.
///
/// Parsing is fail-closed: anything that is not exactly "premium" or "admin"
/// grants no privileges beyond an ordinary signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Premium,
    Admin,
}

impl Role {
    pub fn parse(raw: &str) -> Role {
        match raw {
            "admin" => Role::Admin,
            "premium" => Role::Premium,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Premium => "premium",
            Role::Admin => "admin",
        }
    }
}

/// The server-owned user record, keyed by email.
///
/// `premium_expiry` is kept as the raw timestamp string the subscription flow
/// wrote; it is parsed at evaluation time (see `session::entitlement`) so a
/// malformed value denies access instead of failing the fetch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub role: String,
    pub premium_expiry: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }
}

/// Body of `PATCH /users/:email`. All fields optional; absent fields are left
/// untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub photo_url: Option<String>,
    /// Set by the subscription flow after a confirmed payment. Also promotes
    /// role user → premium (never touches admin).
    pub premium_expiry: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_known_values() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("premium"), Role::Premium);
        assert_eq!(Role::parse("user"), Role::User);
    }

    #[test]
    fn test_role_parse_unknown_grants_nothing() {
        assert_eq!(Role::parse("ADMIN"), Role::User);
        assert_eq!(Role::parse("superuser"), Role::User);
        assert_eq!(Role::parse(""), Role::User);
    }

    #[test]
    fn test_role_round_trips_through_as_str() {
        for role in [Role::User, Role::Premium, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), role);
        }
    }
}
