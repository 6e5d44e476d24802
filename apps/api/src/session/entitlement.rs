use chrono::{DateTime, Utc};

use crate::models::user::UserRecord;

/// Whether `user` may view premium-flagged content at `now`.
///
/// Fail closed: a missing or malformed expiry never grants access, and an
/// expiry exactly equal to `now` has already lapsed (strict greater-than).
pub fn is_entitled(user: &UserRecord, now: DateTime<Utc>) -> bool {
    let Some(raw) = user.premium_expiry.as_deref() else {
        return false;
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(expiry) => expiry.with_timezone(&Utc) > now,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn make_user(premium_expiry: Option<&str>) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            email: "reader@example.com".to_string(),
            name: "Reader".to_string(),
            photo_url: None,
            role: "premium".to_string(),
            premium_expiry: premium_expiry.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_future_expiry_is_entitled() {
        let user = make_user(Some("2099-01-01T00:00:00Z"));
        assert!(is_entitled(&user, at(2025, 1, 1)));
    }

    #[test]
    fn test_past_expiry_is_not_entitled() {
        let user = make_user(Some("2020-01-01T00:00:00Z"));
        assert!(!is_entitled(&user, at(2025, 1, 1)));
    }

    #[test]
    fn test_missing_expiry_is_not_entitled() {
        let user = make_user(None);
        assert!(!is_entitled(&user, at(2025, 1, 1)));
    }

    #[test]
    fn test_malformed_expiry_fails_closed() {
        for raw in ["soon", "2099-13-99", "1735689600", ""] {
            let user = make_user(Some(raw));
            assert!(!is_entitled(&user, at(2025, 1, 1)), "{raw:?} must not entitle");
        }
    }

    #[test]
    fn test_expiry_equal_to_now_is_not_entitled() {
        let user = make_user(Some("2025-01-01T00:00:00Z"));
        assert!(!is_entitled(&user, at(2025, 1, 1)));
    }

    #[test]
    fn test_one_second_past_now_is_entitled() {
        let user = make_user(Some("2025-01-01T00:00:01Z"));
        assert!(is_entitled(&user, at(2025, 1, 1)));
    }

    #[test]
    fn test_offset_timestamps_compare_in_utc() {
        // 05:00+05:00 is exactly midnight UTC — not entitled at that instant.
        let user = make_user(Some("2025-01-01T05:00:00+05:00"));
        assert!(!is_entitled(&user, at(2025, 1, 1)));
        assert!(is_entitled(&user, at(2024, 12, 31)));
    }
}
