//! Family repository for database operations.
//!
//! Families own two generated system tags (`<NAME>_HEAD`, `<NAME>_MEMBER`).
//! Create and rename keep the family row and its tag rows consistent in
//! one transaction; renames update the tag rows in place so assignment
//! history stays attached to the same tag identity.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::FamilyEntity;
use domain::services::tag_naming::{generated_tag_name, GeneratedRole};

const FAMILY_COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Default display color for generated tags.
const GENERATED_TAG_COLOR: &str = "#8b5cf6";

/// Repository for family groups and their generated tags.
#[derive(Clone)]
pub struct FamilyRepository {
    pool: PgPool,
}

impl FamilyRepository {
    /// Creates a new FamilyRepository with the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a family by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<FamilyEntity>, sqlx::Error> {
        sqlx::query_as::<_, FamilyEntity>(&format!(
            "SELECT {} FROM families WHERE id = $1",
            FAMILY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List families by name.
    pub async fn list(&self) -> Result<Vec<FamilyEntity>, sqlx::Error> {
        sqlx::query_as::<_, FamilyEntity>(&format!(
            "SELECT {} FROM families ORDER BY name ASC",
            FAMILY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    /// Create a family and its two generated tags atomically.
    pub async fn create_with_tags(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<FamilyEntity, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let family = sqlx::query_as::<_, FamilyEntity>(&format!(
            r#"
            INSERT INTO families (name, description)
            VALUES ($1, $2)
            RETURNING {}
            "#,
            FAMILY_COLUMNS
        ))
        .bind(name)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        for role in [GeneratedRole::Head, GeneratedRole::Member] {
            sqlx::query(
                r#"
                INSERT INTO tags (name, description, color, tag_type, is_system, show_on_registration)
                VALUES ($1, $2, $3, 'SYSTEM', true, false)
                "#,
            )
            .bind(generated_tag_name(name, role))
            .bind(format!("Generated for family {}", name))
            .bind(GENERATED_TAG_COLOR)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(family)
    }

    /// Update a family; a rename also renames its generated tag rows in
    /// place within the same transaction.
    pub async fn update_with_tags(
        &self,
        id: Uuid,
        new_name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<FamilyEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(existing) = sqlx::query_as::<_, FamilyEntity>(&format!(
            "SELECT {} FROM families WHERE id = $1 FOR UPDATE",
            FAMILY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        if let Some(new_name) = new_name {
            for role in [GeneratedRole::Head, GeneratedRole::Member] {
                sqlx::query("UPDATE tags SET name = $2, updated_at = NOW() WHERE name = $1")
                    .bind(generated_tag_name(&existing.name, role))
                    .bind(generated_tag_name(new_name, role))
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let updated = sqlx::query_as::<_, FamilyEntity>(&format!(
            r#"
            UPDATE families SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            FAMILY_COLUMNS
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
