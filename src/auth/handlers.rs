use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{
            AuthResponse, ChangePasswordRequest, LoginRequest, ProfileResponse, PublicUser,
            RefreshRequest, RegisterRequest, SkillInput, UpdateProfileRequest,
        },
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::User,
    },
    error::{is_unique_violation, ApiError},
    state::AppState,
    users,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/profile", get(get_profile).put(update_profile))
        .route("/auth/change-password", put(change_password))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn validate_username(username: &str) -> Result<(), ApiError> {
    let len = username.chars().count();
    if !(3..=20).contains(&len) {
        return Err(ApiError::Validation(
            "Username must be between 3 and 20 characters".into(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".into(),
        ));
    }
    Ok(())
}

const PROFICIENCY_LEVELS: [&str; 4] = ["beginner", "intermediate", "advanced", "expert"];

fn validate_skill_inputs(skills: &[SkillInput]) -> Result<(), ApiError> {
    for skill in skills {
        if !PROFICIENCY_LEVELS.contains(&skill.proficiency_level.as_str()) {
            return Err(ApiError::Validation(format!(
                "Invalid proficiency level: {}",
                skill.proficiency_level
            )));
        }
        if skill.years_experience < 0 {
            return Err(ApiError::Validation(
                "Years of experience cannot be negative".into(),
            ));
        }
    }
    Ok(())
}

fn token_pair(state: &AppState, user_id: Uuid) -> Result<(String, String), ApiError> {
    let keys = JwtKeys::from_ref(state);
    let access = keys.sign_access(user_id)?;
    let refresh = keys.sign_refresh(user_id)?;
    Ok((access, refresh))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    validate_username(&payload.username)?;
    validate_password(&payload.password)?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }
    if User::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        warn!(username = %payload.username, "username already taken");
        return Err(ApiError::Conflict("Username already taken".into()));
    }

    let hash = hash_password(&payload.password)?;

    let user = User::create(
        &state.db,
        &payload.username,
        &payload.email,
        &hash,
        payload.bio.as_deref(),
    )
    .await
    .map_err(|e| {
        // Unique index backstop for the register/register race.
        if is_unique_violation(&e) {
            ApiError::Conflict("Email or username already registered".into())
        } else {
            ApiError::from(e)
        }
    })?;

    let (access_token, refresh_token) = token_pair(&state, user.id)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access_token,
            refresh_token,
            user: PublicUser {
                id: user.id,
                username: user.username,
                email: user.email,
                bio: user.bio,
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::Auth("Invalid email or password".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Auth("Invalid email or password".into()));
    }

    let (access_token, refresh_token) = token_pair(&state, user.id)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
            bio: user.bio,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::Auth(e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Auth("User not found".into()))?;

    let (access_token, refresh_token) = token_pair(&state, user.id)?;

    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
            bio: user.bio,
        },
    }))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Auth("User not found".into()))?;

    let skills = users::repo::skills_for_user(&state.db, user_id).await?;

    Ok(Json(ProfileResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        bio: user.bio,
        created_at: user.created_at,
        skills,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Auth("User not found".into()))?;

    let username = match payload.username {
        Some(name) => {
            let name = name.trim().to_string();
            validate_username(&name)?;
            if name != user.username {
                if User::find_by_username(&state.db, &name).await?.is_some() {
                    return Err(ApiError::Conflict("Username already taken".into()));
                }
            }
            name
        }
        None => user.username.clone(),
    };
    let bio = match payload.bio {
        Some(b) => Some(b),
        None => user.bio.clone(),
    };

    let updated = User::update_profile(&state.db, user_id, &username, bio.as_deref()).await?;

    if let Some(skills) = payload.skills {
        validate_skill_inputs(&skills)?;
        let ids: Vec<Uuid> = skills.iter().map(|s| s.skill_id).collect();
        if !users::repo::skills_exist(&state.db, &ids).await? {
            return Err(ApiError::NotFound("Skill not found".into()));
        }
        User::replace_skills(&state.db, user_id, &skills).await?;
    }

    let skills = users::repo::skills_for_user(&state.db, user_id).await?;

    info!(user_id = %user_id, "profile updated");
    Ok(Json(ProfileResponse {
        id: updated.id,
        username: updated.username,
        email: updated.email,
        bio: updated.bio,
        created_at: updated.created_at,
        skills,
    }))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Auth("User not found".into()))?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!(user_id = %user_id, "change password with wrong current password");
        return Err(ApiError::Validation("Current password is incorrect".into()));
    }
    validate_password(&payload.new_password)?;

    let hash = hash_password(&payload.new_password)?;
    User::update_password(&state.db, user_id, &hash).await?;

    info!(user_id = %user_id, "password changed");
    Ok(Json(serde_json::json!({
        "message": "Password updated successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn username_bounds() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"x".repeat(20)).is_ok());
        assert!(validate_username(&"x".repeat(21)).is_err());
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn skill_inputs_reject_unknown_proficiency() {
        let skills = vec![SkillInput {
            skill_id: Uuid::new_v4(),
            proficiency_level: "wizard".into(),
            years_experience: 3,
        }];
        assert!(validate_skill_inputs(&skills).is_err());
    }

    #[test]
    fn skill_inputs_reject_negative_years() {
        let skills = vec![SkillInput {
            skill_id: Uuid::new_v4(),
            proficiency_level: "expert".into(),
            years_experience: -1,
        }];
        assert!(validate_skill_inputs(&skills).is_err());
    }

    #[test]
    fn skill_inputs_accept_all_known_levels() {
        for level in PROFICIENCY_LEVELS {
            let skills = vec![SkillInput {
                skill_id: Uuid::new_v4(),
                proficiency_level: level.into(),
                years_experience: 0,
            }];
            assert!(validate_skill_inputs(&skills).is_ok());
        }
    }
}
