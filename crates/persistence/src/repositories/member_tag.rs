//! MemberTag repository for database operations.
//!
//! Rows are deactivated, never deleted; the table doubles as the
//! assignment history. The "at most one active row per (member, tag)"
//! invariant is application-enforced: every creation path goes through
//! a find-active check first.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{MemberTagEntity, MemberTagWithNameEntity};
use crate::metrics::QueryTimer;

const MEMBER_TAG_COLUMNS: &str = "id, member_id, tag_id, assigned_by, assigned_at, removed_by, \
     removed_at, expires_at, notes, is_active";

/// Repository for member-tag assignment operations.
#[derive(Clone)]
pub struct MemberTagRepository {
    pool: PgPool,
}

impl MemberTagRepository {
    /// Creates a new MemberTagRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the active assignment of a tag to a member, if any.
    ///
    /// The returned row may be expired-but-still-active; callers decide
    /// whether to heal it.
    pub async fn find_active(
        &self,
        member_id: Uuid,
        tag_id: Uuid,
    ) -> Result<Option<MemberTagEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_member_tag");
        let result = sqlx::query_as::<_, MemberTagEntity>(&format!(
            r#"
            SELECT {} FROM member_tags
            WHERE member_id = $1 AND tag_id = $2 AND is_active = true
            ORDER BY assigned_at DESC
            LIMIT 1
            "#,
            MEMBER_TAG_COLUMNS
        ))
        .bind(member_id)
        .bind(tag_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert a fresh assignment row.
    pub async fn insert(
        &self,
        member_id: Uuid,
        tag_id: Uuid,
        assigned_by: Option<Uuid>,
        expires_at: Option<DateTime<Utc>>,
        notes: Option<&str>,
    ) -> Result<MemberTagEntity, sqlx::Error> {
        sqlx::query_as::<_, MemberTagEntity>(&format!(
            r#"
            INSERT INTO member_tags (member_id, tag_id, assigned_by, expires_at, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            MEMBER_TAG_COLUMNS
        ))
        .bind(member_id)
        .bind(tag_id)
        .bind(assigned_by)
        .bind(expires_at)
        .bind(notes)
        .fetch_one(&self.pool)
        .await
    }

    /// Deactivate one assignment row, stamping who removed it and why.
    pub async fn deactivate(
        &self,
        id: Uuid,
        removed_by: Option<Uuid>,
        reason: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE member_tags
            SET is_active = false,
                removed_by = $2,
                removed_at = NOW(),
                notes = COALESCE($3, notes)
            WHERE id = $1 AND is_active = true
            "#,
        )
        .bind(id)
        .bind(removed_by)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Deactivate whatever active assignment exists for (member, tag).
    /// Returns the number of rows affected (0 when none was active).
    pub async fn deactivate_active(
        &self,
        member_id: Uuid,
        tag_id: Uuid,
        removed_by: Option<Uuid>,
        reason: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE member_tags
            SET is_active = false,
                removed_by = $3,
                removed_at = NOW(),
                notes = COALESCE($4, notes)
            WHERE member_id = $1 AND tag_id = $2 AND is_active = true
            "#,
        )
        .bind(member_id)
        .bind(tag_id)
        .bind(removed_by)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Full assignment history for a member, newest first.
    pub async fn history_for_member(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<MemberTagWithNameEntity>, sqlx::Error> {
        sqlx::query_as::<_, MemberTagWithNameEntity>(
            r#"
            SELECT mt.id, mt.member_id, mt.tag_id, t.name AS tag_name, mt.assigned_by,
                   mt.assigned_at, mt.removed_by, mt.removed_at, mt.expires_at, mt.notes,
                   mt.is_active
            FROM member_tags mt
            JOIN tags t ON t.id = mt.tag_id
            WHERE mt.member_id = $1
            ORDER BY mt.assigned_at DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Active assignments for a member (expired rows included; readers
    /// heal them lazily).
    pub async fn active_for_member(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<MemberTagWithNameEntity>, sqlx::Error> {
        sqlx::query_as::<_, MemberTagWithNameEntity>(
            r#"
            SELECT mt.id, mt.member_id, mt.tag_id, t.name AS tag_name, mt.assigned_by,
                   mt.assigned_at, mt.removed_by, mt.removed_at, mt.expires_at, mt.notes,
                   mt.is_active
            FROM member_tags mt
            JOIN tags t ON t.id = mt.tag_id
            WHERE mt.member_id = $1 AND mt.is_active = true
            ORDER BY t.name ASC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Member ids with an active assignment of the given tag.
    pub async fn member_ids_with_active_tag(
        &self,
        tag_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT member_id FROM member_tags WHERE tag_id = $1 AND is_active = true",
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// Sweep: deactivate every active row whose expiry has passed.
    /// Returns the number of rows healed.
    pub async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("deactivate_expired_member_tags");
        let result = sqlx::query(
            r#"
            UPDATE member_tags
            SET is_active = false,
                removed_by = NULL,
                removed_at = $1,
                notes = 'expired'
            WHERE is_active = true AND expires_at IS NOT NULL AND expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
