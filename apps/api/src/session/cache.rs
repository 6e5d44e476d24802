use redis::AsyncCommands;
use tracing::warn;

use crate::models::user::UserRecord;

/// The cache is session-scoped by design: short TTL, invalidated on any
/// mutation of the record. Entitlement is never derived from anything older
/// than the last successful fetch.
const USER_CACHE_TTL_SECS: u64 = 300;

fn cache_key(email: &str) -> String {
    format!("user:{email}")
}

/// Best-effort cache read. Any Redis or decode failure is treated as a miss —
/// the resolver falls through to Postgres.
pub async fn get(client: &redis::Client, email: &str) -> Option<UserRecord> {
    let mut conn = match client.get_multiplexed_async_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            warn!("user cache unavailable: {e}");
            return None;
        }
    };

    let raw: Option<String> = match conn.get(cache_key(email)).await {
        Ok(value) => value,
        Err(e) => {
            warn!("user cache read failed for {email}: {e}");
            None
        }
    };

    raw.and_then(|json| serde_json::from_str(&json).ok())
}

/// Best-effort cache fill. Last successful fetch wins.
pub async fn put(client: &redis::Client, user: &UserRecord) {
    let Ok(json) = serde_json::to_string(user) else {
        return;
    };
    let Ok(mut conn) = client.get_multiplexed_async_connection().await else {
        return;
    };
    if let Err(e) = conn
        .set_ex::<_, _, ()>(cache_key(&user.email), json, USER_CACHE_TTL_SECS)
        .await
    {
        warn!("user cache write failed for {}: {e}", user.email);
    }
}

/// Drops the cached record so the next resolution refetches. Called by every
/// user mutation.
pub async fn invalidate(client: &redis::Client, email: &str) {
    let Ok(mut conn) = client.get_multiplexed_async_connection().await else {
        return;
    };
    if let Err(e) = conn.del::<_, ()>(cache_key(email)).await {
        warn!("user cache invalidation failed for {email}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_scoped_by_email() {
        assert_eq!(cache_key("a@b.com"), "user:a@b.com");
        assert_ne!(cache_key("a@b.com"), cache_key("c@d.com"));
    }
}
