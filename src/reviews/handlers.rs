use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{is_unique_violation, ApiError},
    sessions::repo::Session,
    sessions::status::SessionStatus,
    state::AppState,
    users,
};

use super::dto::{CreateReviewRequest, UserReviews};
use super::repo::{self, Review, ReviewDetail};

const RECENT_REVIEWS_LIMIT: i64 = 50;

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_reviews).post(create_review))
        .route("/reviews/user/:user_id", get(user_reviews))
}

fn validate_rating(rating: i32) -> Result<(), ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::Validation(
            "Rating must be between 1 and 5".into(),
        ));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn create_review(
    State(state): State<AppState>,
    AuthUser(reviewer_id): AuthUser,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewDetail>), ApiError> {
    validate_rating(payload.rating)?;

    let session = Session::find_by_id(&state.db, payload.session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found".into()))?;

    if session.teacher_id != reviewer_id && session.student_id != reviewer_id {
        warn!(session_id = %session.id, user_id = %reviewer_id, "review by non-participant rejected");
        return Err(ApiError::Forbidden(
            "Only session participants can leave a review".into(),
        ));
    }

    if session.status != SessionStatus::Completed.as_str() {
        return Err(ApiError::State(
            "Only completed sessions can be reviewed".into(),
        ));
    }

    if Review::exists_for(&state.db, session.id, reviewer_id).await? {
        return Err(ApiError::Conflict(
            "You have already reviewed this session".into(),
        ));
    }

    // The other participant is always the reviewee.
    let reviewee_id = if session.teacher_id == reviewer_id {
        session.student_id
    } else {
        session.teacher_id
    };

    let review = Review::create(
        &state.db,
        session.id,
        reviewer_id,
        reviewee_id,
        payload.rating,
        payload.comment.as_deref(),
    )
    .await
    .map_err(|e| {
        // Unique index backstop for two concurrent submissions.
        if is_unique_violation(&e) {
            ApiError::Conflict("You have already reviewed this session".into())
        } else {
            ApiError::from(e)
        }
    })?;

    let detail = repo::find_detail_by_id(&state.db, review.id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("review vanished after insert")))?;

    info!(
        review_id = %review.id,
        session_id = %session.id,
        reviewer_id = %reviewer_id,
        reviewee_id = %reviewee_id,
        rating = review.rating,
        "review created"
    );
    Ok((StatusCode::CREATED, Json(detail)))
}

#[instrument(skip(state))]
pub async fn list_reviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReviewDetail>>, ApiError> {
    let reviews = repo::list_recent(&state.db, RECENT_REVIEWS_LIMIT).await?;
    Ok(Json(reviews))
}

#[instrument(skip(state))]
pub async fn user_reviews(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserReviews>, ApiError> {
    let given = repo::list_given(&state.db, user_id).await?;
    let received = repo::list_received(&state.db, user_id).await?;
    let (average_rating, total_received) = users::repo::rating_summary(&state.db, user_id).await?;

    Ok(Json(UserReviews {
        given,
        received,
        average_rating,
        total_received,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-1).is_err());
    }
}
