use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    error::{is_unique_violation, ApiError},
    state::AppState,
};

use super::dto::CreateSkillRequest;
use super::repo::Skill;

pub fn skill_routes() -> Router<AppState> {
    Router::new().route("/skills", get(list_skills).post(create_skill))
}

#[instrument(skip(state))]
pub async fn list_skills(State(state): State<AppState>) -> Result<Json<Vec<Skill>>, ApiError> {
    let skills = Skill::list_all(&state.db).await?;
    Ok(Json(skills))
}

#[instrument(skip(state, payload))]
pub async fn create_skill(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateSkillRequest>,
) -> Result<(StatusCode, Json<Skill>), ApiError> {
    let name = payload.name.trim();
    let category = payload.category.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Skill name is required".into()));
    }
    if category.is_empty() {
        return Err(ApiError::Validation("Skill category is required".into()));
    }

    let skill = Skill::create(&state.db, name, category, payload.description.as_deref())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Skill already exists".into())
            } else {
                ApiError::from(e)
            }
        })?;

    info!(skill_id = %skill.id, user_id = %user_id, name = %skill.name, "skill created");
    Ok((StatusCode::CREATED, Json(skill)))
}
