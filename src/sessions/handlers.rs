use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    listings::dto::{clamp_pagination, page_count},
    listings::repo::Listing,
    state::AppState,
};

use super::dto::{CreateSessionRequest, SessionQuery, SessionsPage, UpdateSessionRequest};
use super::repo::{self, Session};
use super::status::{SessionStatus, ALL_STATUSES};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/user/:user_id", get(user_sessions))
        .route("/sessions/:id", get(get_session).put(update_session))
}

fn validate_duration(minutes: i32, min: i32, max: i32) -> Result<(), ApiError> {
    if !(min..=max).contains(&minutes) {
        return Err(ApiError::Validation(format!(
            "Duration must be between {min} and {max} minutes"
        )));
    }
    Ok(())
}

fn parse_status(raw: &str) -> Result<SessionStatus, ApiError> {
    raw.parse::<SessionStatus>()
        .map_err(|_| ApiError::Validation(format!("Invalid status: {raw}")))
}

#[instrument(skip(state, payload))]
pub async fn create_session(
    State(state): State<AppState>,
    AuthUser(student_id): AuthUser,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<repo::SessionDetail>), ApiError> {
    let listing = Listing::find_by_id(&state.db, payload.listing_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Listing not found".into()))?;

    if listing.user_id == student_id {
        warn!(listing_id = %listing.id, user_id = %student_id, "attempt to book own listing");
        return Err(ApiError::Validation("Cannot book your own listing".into()));
    }

    if payload.scheduled_date <= OffsetDateTime::now_utc() {
        return Err(ApiError::Validation(
            "Scheduled date must be in the future".into(),
        ));
    }
    let policy = &state.config.policy;
    validate_duration(
        payload.duration_minutes,
        policy.session_min_minutes,
        policy.session_max_minutes,
    )?;

    let session = Session::create(
        &state.db,
        listing.id,
        listing.user_id,
        student_id,
        payload.scheduled_date,
        payload.duration_minutes,
        payload.notes.as_deref(),
    )
    .await?;

    let detail = repo::find_detail_by_id(&state.db, session.id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("session vanished after insert")))?;

    info!(
        session_id = %session.id,
        listing_id = %listing.id,
        teacher_id = %listing.user_id,
        student_id = %student_id,
        "session booked"
    );
    Ok((StatusCode::CREATED, Json(detail)))
}

#[instrument(skip(state))]
pub async fn list_sessions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<SessionQuery>,
) -> Result<Json<SessionsPage>, ApiError> {
    let (page, per_page) = clamp_pagination(query.page, query.per_page);
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(parse_status(raw)?),
        None => None,
    };

    let total = repo::count_for_user(&state.db, user_id, status).await?;
    let sessions =
        repo::list_for_user(&state.db, user_id, status, per_page, (page - 1) * per_page).await?;

    Ok(Json(SessionsPage {
        sessions,
        total,
        pages: page_count(total, per_page),
        current_page: page,
        per_page,
    }))
}

#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<repo::SessionDetail>, ApiError> {
    let session = Session::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found".into()))?;

    if session.teacher_id != user_id && session.student_id != user_id {
        return Err(ApiError::Forbidden(
            "Only session participants can view this session".into(),
        ));
    }

    let detail = repo::find_detail_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found".into()))?;
    Ok(Json(detail))
}

#[instrument(skip(state, payload))]
pub async fn update_session(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSessionRequest>,
) -> Result<Json<repo::SessionDetail>, ApiError> {
    let session = Session::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found".into()))?;

    if session.teacher_id != user_id && session.student_id != user_id {
        warn!(session_id = %id, user_id = %user_id, "update of foreign session rejected");
        return Err(ApiError::Forbidden(
            "Only session participants can update this session".into(),
        ));
    }

    let new_status = match payload.status.as_deref() {
        Some(raw) => Some(parse_status(raw)?),
        None => None,
    };

    // The guard set starts wide open and narrows with each requested
    // change; the repo applies everything in a single compare-and-set so a
    // losing racer leaves the row untouched.
    let mut allowed_from: Vec<SessionStatus> = ALL_STATUSES.to_vec();

    if let Some(target) = new_status {
        if target == SessionStatus::Pending {
            return Err(ApiError::State(
                "A session cannot be returned to pending".into(),
            ));
        }
        if target.requires_teacher() && session.teacher_id != user_id {
            warn!(session_id = %id, user_id = %user_id, "non-teacher tried to confirm");
            return Err(ApiError::Forbidden(
                "Only the teacher can confirm sessions".into(),
            ));
        }
        allowed_from.retain(|s| target.allowed_from().contains(s));
    }

    if payload.scheduled_date.is_some() || payload.duration_minutes.is_some() {
        // Rescheduling is only allowed while the booking is still pending.
        allowed_from.retain(|s| *s == SessionStatus::Pending);

        if let Some(date) = payload.scheduled_date {
            if date <= OffsetDateTime::now_utc() {
                return Err(ApiError::Validation(
                    "Scheduled date must be in the future".into(),
                ));
            }
        }
        if let Some(minutes) = payload.duration_minutes {
            let policy = &state.config.policy;
            validate_duration(
                minutes,
                policy.session_min_minutes,
                policy.session_max_minutes,
            )?;
        }
    }

    if allowed_from.is_empty() {
        return Err(ApiError::State(
            "Requested changes are not valid for any session state".into(),
        ));
    }

    let updated = Session::guarded_update(
        &state.db,
        id,
        new_status,
        payload.scheduled_date,
        payload.duration_minutes,
        payload.notes.as_deref(),
        &allowed_from,
    )
    .await?
    .ok_or_else(|| {
        warn!(session_id = %id, status = %session.status, "update lost to state guard");
        ApiError::State(format!(
            "Session in state '{}' does not allow this change",
            session.status
        ))
    })?;

    if let Some(target) = new_status {
        info!(session_id = %id, user_id = %user_id, status = %target, "session transitioned");
    }

    let detail = repo::find_detail_by_id(&state.db, updated.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found".into()))?;
    Ok(Json(detail))
}

#[instrument(skip(state))]
pub async fn user_sessions(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<repo::SessionDetail>>, ApiError> {
    // Sessions are private to their participants.
    if caller != user_id {
        return Err(ApiError::Forbidden(
            "Cannot view another user's sessions".into(),
        ));
    }

    let sessions = repo::list_all_for_user(&state.db, user_id).await?;
    Ok(Json(sessions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_bounds() {
        assert!(validate_duration(30, 30, 480).is_ok());
        assert!(validate_duration(480, 30, 480).is_ok());
        assert!(validate_duration(29, 30, 480).is_err());
        assert!(validate_duration(481, 30, 480).is_err());
        assert!(validate_duration(0, 30, 480).is_err());
        assert!(validate_duration(-60, 30, 480).is_err());
    }

    #[test]
    fn parse_status_rejects_unknown() {
        assert!(parse_status("confirmed").is_ok());
        let err = parse_status("approved").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn guard_for_confirm_is_pending_only() {
        let target = SessionStatus::Confirmed;
        let mut allowed: Vec<SessionStatus> = ALL_STATUSES.to_vec();
        allowed.retain(|s| target.allowed_from().contains(s));
        assert_eq!(allowed, vec![SessionStatus::Pending]);
    }

    #[test]
    fn guard_for_cancel_plus_reschedule_narrows_to_pending() {
        // cancel allows pending|confirmed, a reschedule narrows to pending
        let target = SessionStatus::Cancelled;
        let mut allowed: Vec<SessionStatus> = ALL_STATUSES.to_vec();
        allowed.retain(|s| target.allowed_from().contains(s));
        allowed.retain(|s| *s == SessionStatus::Pending);
        assert_eq!(allowed, vec![SessionStatus::Pending]);
    }

    #[test]
    fn guard_for_complete_plus_reschedule_is_empty() {
        // complete requires confirmed, a reschedule requires pending: no
        // state satisfies both
        let target = SessionStatus::Completed;
        let mut allowed: Vec<SessionStatus> = ALL_STATUSES.to_vec();
        allowed.retain(|s| target.allowed_from().contains(s));
        allowed.retain(|s| *s == SessionStatus::Pending);
        assert!(allowed.is_empty());
    }
}
