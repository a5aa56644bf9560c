use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::UserSkillEntry;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response returned after login, register or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the authenticated client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
}

/// Caller's own profile, including skill associations.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub skills: Vec<UserSkillEntry>,
}

/// One skill association in a profile update. The list replaces the
/// caller's existing associations wholesale.
#[derive(Debug, Deserialize)]
pub struct SkillInput {
    pub skill_id: Uuid,
    pub proficiency_level: String,
    #[serde(default)]
    pub years_experience: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<SkillInput>>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_accepts_missing_bio() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username":"alice","email":"a@example.com","password":"secret1"}"#,
        )
        .unwrap();
        assert_eq!(req.username, "alice");
        assert!(req.bio.is_none());
    }

    #[test]
    fn public_user_never_carries_password() {
        let user = PublicUser {
            id: Uuid::new_v4(),
            username: "bob".into(),
            email: "bob@example.com".into(),
            bio: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("bob@example.com"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn skill_input_defaults_years_to_zero() {
        let input: SkillInput = serde_json::from_str(&format!(
            r#"{{"skill_id":"{}","proficiency_level":"expert"}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        assert_eq!(input.years_experience, 0);
    }
}
