//! Moderation lifecycle of a submitted article.
//!
//! pending → approved | declined(reason). The premium flag is independent of
//! the state and only meaningful alongside approved. All transitions are
//! admin-triggered; there are no automatic transitions or timeouts, and
//! deletion is terminal from any state.

/// Moderation state, stored as text on the article row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationState {
    Pending,
    Approved,
    Declined,
}

impl ModerationState {
    /// Strict parse — an unrecognized value is a shape mismatch, not a state.
    pub fn parse(raw: &str) -> Option<ModerationState> {
        match raw {
            "pending" => Some(ModerationState::Pending),
            "approved" => Some(ModerationState::Approved),
            "declined" => Some(ModerationState::Declined),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationState::Pending => "pending",
            ModerationState::Approved => "approved",
            ModerationState::Declined => "declined",
        }
    }
}

/// What a moderation action should do to the stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Write the new state.
    Apply(ModerationState),
    /// Already there — issue no state change.
    NoOp,
    /// Not allowed from the current state.
    Invalid(&'static str),
}

/// Admin approves a submission. Idempotent on an already-approved article.
pub fn approve(current: ModerationState) -> Transition {
    match current {
        ModerationState::Pending => Transition::Apply(ModerationState::Approved),
        ModerationState::Approved => Transition::NoOp,
        ModerationState::Declined => Transition::Invalid("a declined article cannot be approved"),
    }
}

/// Admin declines a submission with a reason.
pub fn decline(current: ModerationState) -> Transition {
    match current {
        ModerationState::Pending => Transition::Apply(ModerationState::Declined),
        ModerationState::Declined => Transition::NoOp,
        ModerationState::Approved => Transition::Invalid("an approved article cannot be declined"),
    }
}

/// The premium flag may only be granted to an approved article.
pub fn can_mark_premium(current: ModerationState) -> Result<(), &'static str> {
    match current {
        ModerationState::Approved => Ok(()),
        ModerationState::Pending | ModerationState::Declined => {
            Err("only an approved article can be marked premium")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips() {
        for state in [
            ModerationState::Pending,
            ModerationState::Approved,
            ModerationState::Declined,
        ] {
            assert_eq!(ModerationState::parse(state.as_str()), Some(state));
        }
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        assert_eq!(ModerationState::parse("published"), None);
        assert_eq!(ModerationState::parse("Pending"), None);
        assert_eq!(ModerationState::parse(""), None);
    }

    #[test]
    fn test_approve_pending_applies() {
        assert_eq!(
            approve(ModerationState::Pending),
            Transition::Apply(ModerationState::Approved)
        );
    }

    #[test]
    fn test_approve_approved_is_a_noop() {
        // The server sees a second approve as harmless; no duplicate state
        // change is written.
        assert_eq!(approve(ModerationState::Approved), Transition::NoOp);
    }

    #[test]
    fn test_approve_declined_is_invalid() {
        assert!(matches!(
            approve(ModerationState::Declined),
            Transition::Invalid(_)
        ));
    }

    #[test]
    fn test_decline_pending_applies() {
        assert_eq!(
            decline(ModerationState::Pending),
            Transition::Apply(ModerationState::Declined)
        );
    }

    #[test]
    fn test_decline_approved_is_invalid() {
        assert!(matches!(
            decline(ModerationState::Approved),
            Transition::Invalid(_)
        ));
    }

    #[test]
    fn test_premium_requires_approved() {
        assert!(can_mark_premium(ModerationState::Approved).is_ok());
        assert!(can_mark_premium(ModerationState::Pending).is_err());
        assert!(can_mark_premium(ModerationState::Declined).is_err());
    }
}
