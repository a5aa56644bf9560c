use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Booking lifecycle. A session starts `pending` and can only move
/// forward:
///
/// ```text
/// pending -> confirmed -> completed
/// pending | confirmed -> cancelled
/// ```
///
/// `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

pub const ALL_STATUSES: [SessionStatus; 4] = [
    SessionStatus::Pending,
    SessionStatus::Confirmed,
    SessionStatus::Completed,
    SessionStatus::Cancelled,
];

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Confirmed => "confirmed",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    /// States a session may be in for a transition into `self` to be legal.
    /// Empty means the state can never be entered via the API.
    pub fn allowed_from(&self) -> &'static [SessionStatus] {
        match self {
            SessionStatus::Pending => &[],
            SessionStatus::Confirmed => &[SessionStatus::Pending],
            SessionStatus::Completed => &[SessionStatus::Confirmed],
            SessionStatus::Cancelled => &[SessionStatus::Pending, SessionStatus::Confirmed],
        }
    }

    /// Confirming is the teacher's call; cancelling and completing are open
    /// to both participants.
    pub fn requires_teacher(&self) -> bool {
        matches!(self, SessionStatus::Confirmed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SessionStatus::Pending),
            "confirmed" => Ok(SessionStatus::Confirmed),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn can_move(from: SessionStatus, to: SessionStatus) -> bool {
        to.allowed_from().contains(&from)
    }

    #[test]
    fn pending_can_be_confirmed_or_cancelled_only() {
        assert!(can_move(SessionStatus::Pending, SessionStatus::Confirmed));
        assert!(can_move(SessionStatus::Pending, SessionStatus::Cancelled));
        assert!(!can_move(SessionStatus::Pending, SessionStatus::Completed));
        assert!(!can_move(SessionStatus::Pending, SessionStatus::Pending));
    }

    #[test]
    fn confirmed_can_complete_or_cancel() {
        assert!(can_move(SessionStatus::Confirmed, SessionStatus::Completed));
        assert!(can_move(SessionStatus::Confirmed, SessionStatus::Cancelled));
        assert!(!can_move(SessionStatus::Confirmed, SessionStatus::Confirmed));
        assert!(!can_move(SessionStatus::Confirmed, SessionStatus::Pending));
    }

    #[test]
    fn terminal_states_admit_nothing() {
        for from in [SessionStatus::Completed, SessionStatus::Cancelled] {
            for to in ALL_STATUSES {
                assert!(!can_move(from, to), "{from} -> {to} should be illegal");
            }
        }
    }

    #[test]
    fn pending_cannot_be_reentered() {
        assert!(SessionStatus::Pending.allowed_from().is_empty());
    }

    #[test]
    fn only_confirm_is_teacher_only() {
        assert!(SessionStatus::Confirmed.requires_teacher());
        assert!(!SessionStatus::Cancelled.requires_teacher());
        assert!(!SessionStatus::Completed.requires_teacher());
    }

    #[test]
    fn round_trips_through_strings() {
        for status in ALL_STATUSES {
            assert_eq!(status.as_str().parse::<SessionStatus>(), Ok(status));
        }
        assert!("unknown".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&SessionStatus::Confirmed).unwrap();
        assert_eq!(json, r#""confirmed""#);
        let back: SessionStatus = serde_json::from_str(r#""cancelled""#).unwrap();
        assert_eq!(back, SessionStatus::Cancelled);
    }
}
