use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Listing row as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Listing {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skill_id: Uuid,
    pub title: String,
    pub description: String,
    pub price_per_hour: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Listing joined with its teacher and skill, as served to clients.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ListingDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub skill_id: Uuid,
    pub skill_name: String,
    pub skill_category: String,
    pub title: String,
    pub description: String,
    pub price_per_hour: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const DETAIL_SELECT: &str = r#"
    SELECT l.id, l.user_id, u.username, l.skill_id, s.name AS skill_name,
           s.category AS skill_category, l.title, l.description,
           l.price_per_hour, l.created_at
    FROM listings l
    JOIN users u ON u.id = l.user_id
    JOIN skills s ON s.id = l.skill_id
"#;

impl Listing {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Listing>> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            SELECT id, user_id, skill_id, title, description, price_per_hour, created_at
            FROM listings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(listing)
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        skill_id: Uuid,
        title: &str,
        description: &str,
        price_per_hour: f64,
    ) -> anyhow::Result<Listing> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (user_id, skill_id, title, description, price_per_hour)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, skill_id, title, description, price_per_hour, created_at
            "#,
        )
        .bind(user_id)
        .bind(skill_id)
        .bind(title)
        .bind(description)
        .bind(price_per_hour)
        .fetch_one(db)
        .await?;
        Ok(listing)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        skill_id: Uuid,
        title: &str,
        description: &str,
        price_per_hour: f64,
    ) -> anyhow::Result<Listing> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings
            SET skill_id = $2, title = $3, description = $4, price_per_hour = $5
            WHERE id = $1
            RETURNING id, user_id, skill_id, title, description, price_per_hour, created_at
            "#,
        )
        .bind(id)
        .bind(skill_id)
        .bind(title)
        .bind(description)
        .bind(price_per_hour)
        .fetch_one(db)
        .await?;
        Ok(listing)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

pub async fn find_detail_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<ListingDetail>> {
    let sql = format!("{DETAIL_SELECT} WHERE l.id = $1");
    let listing = sqlx::query_as::<_, ListingDetail>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(listing)
}

/// Filtered, newest-first page of listings. `category` matches the skill
/// category exactly; `search` is a case-insensitive substring over title,
/// description and skill name.
pub async fn list_filtered(
    db: &PgPool,
    category: Option<&str>,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<ListingDetail>> {
    let sql = format!(
        r#"{DETAIL_SELECT}
        WHERE ($1::text IS NULL OR s.category = $1)
          AND ($2::text IS NULL
               OR l.title ILIKE '%' || $2 || '%'
               OR l.description ILIKE '%' || $2 || '%'
               OR s.name ILIKE '%' || $2 || '%')
        ORDER BY l.created_at DESC
        LIMIT $3 OFFSET $4
        "#
    );
    let rows = sqlx::query_as::<_, ListingDetail>(&sql)
        .bind(category)
        .bind(search)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn count_filtered(
    db: &PgPool,
    category: Option<&str>,
    search: Option<&str>,
) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM listings l
        JOIN skills s ON s.id = l.skill_id
        WHERE ($1::text IS NULL OR s.category = $1)
          AND ($2::text IS NULL
               OR l.title ILIKE '%' || $2 || '%'
               OR l.description ILIKE '%' || $2 || '%'
               OR s.name ILIKE '%' || $2 || '%')
        "#,
    )
    .bind(category)
    .bind(search)
    .fetch_one(db)
    .await?;
    Ok(count)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<ListingDetail>> {
    let sql = format!("{DETAIL_SELECT} WHERE l.user_id = $1 ORDER BY l.created_at DESC");
    let rows = sqlx::query_as::<_, ListingDetail>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}
