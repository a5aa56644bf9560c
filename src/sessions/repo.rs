use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::status::SessionStatus;

/// Session row as stored. `status` stays a string at this layer; the
/// transition rules live in [`SessionStatus`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub teacher_id: Uuid,
    pub student_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_date: OffsetDateTime,
    pub duration_minutes: i32,
    pub status: String,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Session joined with both participants and the listing title.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionDetail {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub listing_title: String,
    pub teacher_id: Uuid,
    pub teacher_username: String,
    pub student_id: Uuid,
    pub student_username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_date: OffsetDateTime,
    pub duration_minutes: i32,
    pub status: String,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const DETAIL_SELECT: &str = r#"
    SELECT se.id, se.listing_id, l.title AS listing_title,
           se.teacher_id, t.username AS teacher_username,
           se.student_id, st.username AS student_username,
           se.scheduled_date, se.duration_minutes, se.status, se.notes, se.created_at
    FROM sessions se
    JOIN listings l ON l.id = se.listing_id
    JOIN users t ON t.id = se.teacher_id
    JOIN users st ON st.id = se.student_id
"#;

impl Session {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, listing_id, teacher_id, student_id, scheduled_date,
                   duration_minutes, status, notes, created_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(session)
    }

    pub async fn create(
        db: &PgPool,
        listing_id: Uuid,
        teacher_id: Uuid,
        student_id: Uuid,
        scheduled_date: OffsetDateTime,
        duration_minutes: i32,
        notes: Option<&str>,
    ) -> anyhow::Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions
                (listing_id, teacher_id, student_id, scheduled_date, duration_minutes, notes, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING id, listing_id, teacher_id, student_id, scheduled_date,
                      duration_minutes, status, notes, created_at
            "#,
        )
        .bind(listing_id)
        .bind(teacher_id)
        .bind(student_id)
        .bind(scheduled_date)
        .bind(duration_minutes)
        .bind(notes)
        .fetch_one(db)
        .await?;
        Ok(session)
    }

    /// Apply a guarded update as one compare-and-set: the row is touched
    /// only if its current status is in `allowed_from`, so a concurrent
    /// writer cannot race the same transition. Returns `None` when the
    /// guard did not match and the row was left unchanged.
    pub async fn guarded_update(
        db: &PgPool,
        id: Uuid,
        new_status: Option<SessionStatus>,
        scheduled_date: Option<OffsetDateTime>,
        duration_minutes: Option<i32>,
        notes: Option<&str>,
        allowed_from: &[SessionStatus],
    ) -> anyhow::Result<Option<Session>> {
        let allowed: Vec<&str> = allowed_from.iter().map(|s| s.as_str()).collect();
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET status = COALESCE($2, status),
                scheduled_date = COALESCE($3, scheduled_date),
                duration_minutes = COALESCE($4, duration_minutes),
                notes = COALESCE($5, notes)
            WHERE id = $1 AND status = ANY($6)
            RETURNING id, listing_id, teacher_id, student_id, scheduled_date,
                      duration_minutes, status, notes, created_at
            "#,
        )
        .bind(id)
        .bind(new_status.map(|s| s.as_str()))
        .bind(scheduled_date)
        .bind(duration_minutes)
        .bind(notes)
        .bind(&allowed)
        .fetch_optional(db)
        .await?;
        Ok(session)
    }
}

pub async fn find_detail_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<SessionDetail>> {
    let sql = format!("{DETAIL_SELECT} WHERE se.id = $1");
    let session = sqlx::query_as::<_, SessionDetail>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(session)
}

/// Page of sessions where the user is teacher or student, newest
/// scheduled first, optionally restricted to one status.
pub async fn list_for_user(
    db: &PgPool,
    user_id: Uuid,
    status: Option<SessionStatus>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<SessionDetail>> {
    let sql = format!(
        r#"{DETAIL_SELECT}
        WHERE (se.teacher_id = $1 OR se.student_id = $1)
          AND ($2::text IS NULL OR se.status = $2)
        ORDER BY se.scheduled_date DESC
        LIMIT $3 OFFSET $4
        "#
    );
    let rows = sqlx::query_as::<_, SessionDetail>(&sql)
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn count_for_user(
    db: &PgPool,
    user_id: Uuid,
    status: Option<SessionStatus>,
) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM sessions
        WHERE (teacher_id = $1 OR student_id = $1)
          AND ($2::text IS NULL OR status = $2)
        "#,
    )
    .bind(user_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_one(db)
    .await?;
    Ok(count)
}

pub async fn list_all_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<SessionDetail>> {
    let sql = format!(
        r#"{DETAIL_SELECT}
        WHERE se.teacher_id = $1 OR se.student_id = $1
        ORDER BY se.scheduled_date DESC
        "#
    );
    let rows = sqlx::query_as::<_, SessionDetail>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}
