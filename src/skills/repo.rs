use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Skill catalog entry. Read-mostly; rows are only ever created.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
}

impl Skill {
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Skill>> {
        let rows = sqlx::query_as::<_, Skill>(
            r#"
            SELECT id, name, category, description
            FROM skills
            ORDER BY category, name
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Skill>> {
        let skill = sqlx::query_as::<_, Skill>(
            r#"
            SELECT id, name, category, description
            FROM skills
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(skill)
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        category: &str,
        description: Option<&str>,
    ) -> Result<Skill, sqlx::Error> {
        sqlx::query_as::<_, Skill>(
            r#"
            INSERT INTO skills (name, category, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, category, description
            "#,
        )
        .bind(name)
        .bind(category)
        .bind(description)
        .fetch_one(db)
        .await
    }
}
