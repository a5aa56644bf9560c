use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::ReviewDetail;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub session_id: Uuid,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Reviews of one user, split by direction, with derived aggregates.
#[derive(Debug, Serialize)]
pub struct UserReviews {
    pub given: Vec<ReviewDetail>,
    pub received: Vec<ReviewDetail>,
    pub average_rating: f64,
    pub total_received: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_accepts_missing_comment() {
        let req: CreateReviewRequest = serde_json::from_str(&format!(
            r#"{{"session_id":"{}","rating":5}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        assert_eq!(req.rating, 5);
        assert!(req.comment.is_none());
    }
}
