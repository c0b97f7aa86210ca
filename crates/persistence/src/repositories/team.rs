//! Team repository for database operations.
//!
//! Teams own two generated system tags (`<NAME>_LEADER`, `<NAME>_MEMBER`),
//! managed with the same create/rename-in-lockstep rules as families.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::TeamEntity;
use domain::services::tag_naming::{generated_tag_name, GeneratedRole};

const TEAM_COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Default display color for generated tags.
const GENERATED_TAG_COLOR: &str = "#0ea5e9";

/// Repository for serving teams and their generated tags.
#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    /// Creates a new TeamRepository with the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a team by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TeamEntity>, sqlx::Error> {
        sqlx::query_as::<_, TeamEntity>(&format!(
            "SELECT {} FROM teams WHERE id = $1",
            TEAM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List teams by name.
    pub async fn list(&self) -> Result<Vec<TeamEntity>, sqlx::Error> {
        sqlx::query_as::<_, TeamEntity>(&format!(
            "SELECT {} FROM teams ORDER BY name ASC",
            TEAM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    /// Create a team and its two generated tags atomically.
    pub async fn create_with_tags(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<TeamEntity, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let team = sqlx::query_as::<_, TeamEntity>(&format!(
            r#"
            INSERT INTO teams (name, description)
            VALUES ($1, $2)
            RETURNING {}
            "#,
            TEAM_COLUMNS
        ))
        .bind(name)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        for role in [GeneratedRole::Leader, GeneratedRole::Member] {
            sqlx::query(
                r#"
                INSERT INTO tags (name, description, color, tag_type, is_system, show_on_registration)
                VALUES ($1, $2, $3, 'SYSTEM', true, false)
                "#,
            )
            .bind(generated_tag_name(name, role))
            .bind(format!("Generated for team {}", name))
            .bind(GENERATED_TAG_COLOR)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(team)
    }

    /// Update a team; a rename also renames its generated tag rows in
    /// place within the same transaction.
    pub async fn update_with_tags(
        &self,
        id: Uuid,
        new_name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<TeamEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(existing) = sqlx::query_as::<_, TeamEntity>(&format!(
            "SELECT {} FROM teams WHERE id = $1 FOR UPDATE",
            TEAM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        if let Some(new_name) = new_name {
            for role in [GeneratedRole::Leader, GeneratedRole::Member] {
                sqlx::query("UPDATE tags SET name = $2, updated_at = NOW() WHERE name = $1")
                    .bind(generated_tag_name(&existing.name, role))
                    .bind(generated_tag_name(new_name, role))
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let updated = sqlx::query_as::<_, TeamEntity>(&format!(
            r#"
            UPDATE teams SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TEAM_COLUMNS
        ))
        .bind(id)
        .bind(new_name)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }
}
