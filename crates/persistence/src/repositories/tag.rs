//! Tag repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::TagEntity;

const TAG_COLUMNS: &str =
    "id, name, description, color, tag_type, is_system, show_on_registration, created_at, updated_at";

/// Repository for tag-related database operations.
#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    /// Creates a new TagRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a tag by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TagEntity>, sqlx::Error> {
        sqlx::query_as::<_, TagEntity>(&format!("SELECT {} FROM tags WHERE id = $1", TAG_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Find a tag by its unique name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<TagEntity>, sqlx::Error> {
        sqlx::query_as::<_, TagEntity>(&format!(
            "SELECT {} FROM tags WHERE name = $1",
            TAG_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
    }

    /// List all tags, system tags first, then by name.
    pub async fn list_all(&self) -> Result<Vec<TagEntity>, sqlx::Error> {
        sqlx::query_as::<_, TagEntity>(&format!(
            "SELECT {} FROM tags ORDER BY is_system DESC, name ASC",
            TAG_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    /// Tags offered on the self-registration form.
    pub async fn list_show_on_registration(&self) -> Result<Vec<TagEntity>, sqlx::Error> {
        sqlx::query_as::<_, TagEntity>(&format!(
            "SELECT {} FROM tags WHERE show_on_registration = true ORDER BY name ASC",
            TAG_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    /// Insert a tag row.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        color: &str,
        tag_type: &str,
        is_system: bool,
        show_on_registration: bool,
    ) -> Result<TagEntity, sqlx::Error> {
        sqlx::query_as::<_, TagEntity>(&format!(
            r#"
            INSERT INTO tags (name, description, color, tag_type, is_system, show_on_registration)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            TAG_COLUMNS
        ))
        .bind(name)
        .bind(description)
        .bind(color)
        .bind(tag_type)
        .bind(is_system)
        .bind(show_on_registration)
        .fetch_one(&self.pool)
        .await
    }

    /// Update a tag's mutable fields; absent fields keep their value.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        color: Option<&str>,
        show_on_registration: Option<bool>,
    ) -> Result<Option<TagEntity>, sqlx::Error> {
        sqlx::query_as::<_, TagEntity>(&format!(
            r#"
            UPDATE tags SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                color = COALESCE($4, color),
                show_on_registration = COALESCE($5, show_on_registration),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TAG_COLUMNS
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(color)
        .bind(show_on_registration)
        .fetch_optional(&self.pool)
        .await
    }

    /// Rename a tag in place; the row (and its assignment history) keeps
    /// its identity. Used when a family/team rename propagates to its
    /// generated tags.
    pub async fn rename(&self, id: Uuid, new_name: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE tags SET name = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(new_name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete a custom tag. System tags are refused at the database level
    /// as well as by the service.
    pub async fn delete_custom(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND is_system = false")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
