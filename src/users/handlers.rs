use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{error::ApiError, listings, state::AppState};

use super::dto::{ExpertProfile, UserProfileResponse};
use super::repo;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/experts", get(list_experts))
        .route("/users/:id", get(get_user))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let profile = repo::public_profile(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let listings = listings::repo::list_by_user(&state.db, id).await?;

    Ok(Json(UserProfileResponse { profile, listings }))
}

#[instrument(skip(state))]
pub async fn list_experts(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExpertProfile>>, ApiError> {
    let experts = repo::experts(&state.db).await?;
    Ok(Json(experts))
}
