use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::repo::User;
use crate::users::dto::{ExpertProfile, PublicProfile};

/// A user's association with a catalog skill.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserSkillEntry {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub proficiency_level: String,
    pub years_experience: i32,
}

pub async fn skills_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<UserSkillEntry>> {
    let rows = sqlx::query_as::<_, UserSkillEntry>(
        r#"
        SELECT s.id, s.name, s.category, us.proficiency_level, us.years_experience
        FROM user_skills us
        JOIN skills s ON s.id = us.skill_id
        WHERE us.user_id = $1
        ORDER BY s.name
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// True when every id in `ids` names an existing skill.
pub async fn skills_exist(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<bool> {
    if ids.is_empty() {
        return Ok(true);
    }
    let mut unique = ids.to_vec();
    unique.sort();
    unique.dedup();

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM skills WHERE id = ANY($1)")
        .bind(&unique)
        .fetch_one(db)
        .await?;
    Ok(count as usize == unique.len())
}

/// Round a raw rating average to one decimal, as served to clients.
pub fn round_rating(avg: f64) -> f64 {
    (avg * 10.0).round() / 10.0
}

/// Derived on read from review rows, never stored.
pub async fn rating_summary(db: &PgPool, user_id: Uuid) -> anyhow::Result<(f64, i64)> {
    let (avg, count): (f64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(AVG(rating)::float8, 0), COUNT(*)
        FROM reviews
        WHERE reviewee_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok((round_rating(avg), count))
}

pub async fn public_profile(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<PublicProfile>> {
    let Some(user) = User::find_by_id(db, user_id).await? else {
        return Ok(None);
    };
    let skills = skills_for_user(db, user_id).await?;
    let (average_rating, total_reviews) = rating_summary(db, user_id).await?;
    Ok(Some(PublicProfile {
        id: user.id,
        username: user.username,
        bio: user.bio,
        created_at: user.created_at,
        skills,
        average_rating,
        total_reviews,
    }))
}

/// Users holding at least one advanced or expert proficiency, with their
/// qualifying skills and aggregates.
pub async fn experts(db: &PgPool) -> anyhow::Result<Vec<ExpertProfile>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT DISTINCT u.id, u.username, u.email, u.password_hash, u.bio, u.created_at
        FROM users u
        JOIN user_skills us ON us.user_id = u.id
        WHERE us.proficiency_level IN ('advanced', 'expert')
        ORDER BY u.username
        "#,
    )
    .fetch_all(db)
    .await?;

    let mut result = Vec::with_capacity(users.len());
    for user in users {
        let skills = sqlx::query_as::<_, UserSkillEntry>(
            r#"
            SELECT s.id, s.name, s.category, us.proficiency_level, us.years_experience
            FROM user_skills us
            JOIN skills s ON s.id = us.skill_id
            WHERE us.user_id = $1 AND us.proficiency_level IN ('advanced', 'expert')
            ORDER BY s.name
            "#,
        )
        .bind(user.id)
        .fetch_all(db)
        .await?;

        let (listings_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM listings WHERE user_id = $1")
                .bind(user.id)
                .fetch_one(db)
                .await?;

        let (average_rating, total_reviews) = rating_summary(db, user.id).await?;

        result.push(ExpertProfile {
            id: user.id,
            username: user.username,
            bio: user.bio,
            created_at: user.created_at,
            skills,
            listings_count,
            average_rating,
            total_reviews,
        });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_rounds_to_one_decimal() {
        assert_eq!(round_rating(0.0), 0.0);
        assert_eq!(round_rating(4.25), 4.3);
        assert_eq!(round_rating(4.24), 4.2);
        assert_eq!(round_rating(5.0), 5.0);
        assert_eq!(round_rating(3.333333), 3.3);
    }
}
