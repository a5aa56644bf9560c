use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::SessionDetail;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub listing_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_date: OffsetDateTime,
    pub duration_minutes: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update: a status transition, pending-only reschedules, or a
/// notes edit, in any combination.
#[derive(Debug, Deserialize)]
pub struct UpdateSessionRequest {
    pub status: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub scheduled_date: Option<OffsetDateTime>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
    pub status: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct SessionsPage {
    pub sessions: Vec<SessionDetail>,
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
    pub per_page: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_parses_rfc3339_date() {
        let req: CreateSessionRequest = serde_json::from_str(&format!(
            r#"{{"listing_id":"{}","scheduled_date":"2030-01-15T10:00:00Z","duration_minutes":60}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        assert_eq!(req.duration_minutes, 60);
        assert_eq!(req.scheduled_date.year(), 2030);
        assert!(req.notes.is_none());
    }

    #[test]
    fn update_request_all_fields_optional() {
        let req: UpdateSessionRequest = serde_json::from_str("{}").unwrap();
        assert!(req.status.is_none());
        assert!(req.scheduled_date.is_none());
        assert!(req.duration_minutes.is_none());
        assert!(req.notes.is_none());
    }

    #[test]
    fn session_query_defaults() {
        let q: SessionQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.per_page, 10);
        assert!(q.status.is_none());
    }
}
