use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub session_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Review joined with both usernames, as served to clients.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewDetail {
    pub id: Uuid,
    pub session_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewer_username: String,
    pub reviewee_id: Uuid,
    pub reviewee_username: String,
    pub rating: i32,
    pub comment: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const DETAIL_SELECT: &str = r#"
    SELECT r.id, r.session_id, r.reviewer_id, rv.username AS reviewer_username,
           r.reviewee_id, re.username AS reviewee_username,
           r.rating, r.comment, r.created_at
    FROM reviews r
    JOIN users rv ON rv.id = r.reviewer_id
    JOIN users re ON re.id = r.reviewee_id
"#;

impl Review {
    /// Insert a review. The UNIQUE (session_id, reviewer_id) index makes a
    /// duplicate submission fail here rather than silently double-count.
    pub async fn create(
        db: &PgPool,
        session_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Review, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (session_id, reviewer_id, reviewee_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, session_id, reviewer_id, reviewee_id, rating, comment, created_at
            "#,
        )
        .bind(session_id)
        .bind(reviewer_id)
        .bind(reviewee_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(db)
        .await
    }

    pub async fn exists_for(
        db: &PgPool,
        session_id: Uuid,
        reviewer_id: Uuid,
    ) -> anyhow::Result<bool> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reviews WHERE session_id = $1 AND reviewer_id = $2",
        )
        .bind(session_id)
        .bind(reviewer_id)
        .fetch_one(db)
        .await?;
        Ok(count > 0)
    }
}

pub async fn find_detail_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<ReviewDetail>> {
    let sql = format!("{DETAIL_SELECT} WHERE r.id = $1");
    let review = sqlx::query_as::<_, ReviewDetail>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(review)
}

pub async fn list_recent(db: &PgPool, limit: i64) -> anyhow::Result<Vec<ReviewDetail>> {
    let sql = format!("{DETAIL_SELECT} ORDER BY r.created_at DESC LIMIT $1");
    let rows = sqlx::query_as::<_, ReviewDetail>(&sql)
        .bind(limit)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn list_given(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<ReviewDetail>> {
    let sql = format!("{DETAIL_SELECT} WHERE r.reviewer_id = $1 ORDER BY r.created_at DESC");
    let rows = sqlx::query_as::<_, ReviewDetail>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn list_received(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<ReviewDetail>> {
    let sql = format!("{DETAIL_SELECT} WHERE r.reviewee_id = $1 ORDER BY r.created_at DESC");
    let rows = sqlx::query_as::<_, ReviewDetail>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}
