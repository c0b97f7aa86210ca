//! Event volunteer repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::EventVolunteerEntity;

const VOLUNTEER_COLUMNS: &str = "id, event_id, member_id, assigned_by, assigned_at";

/// Repository for per-event volunteer grants.
#[derive(Clone)]
pub struct EventVolunteerRepository {
    pool: PgPool,
}

impl EventVolunteerRepository {
    /// Creates a new EventVolunteerRepository with the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the volunteer grant for (event, member), if any.
    pub async fn find(
        &self,
        event_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<EventVolunteerEntity>, sqlx::Error> {
        sqlx::query_as::<_, EventVolunteerEntity>(&format!(
            "SELECT {} FROM event_volunteers WHERE event_id = $1 AND member_id = $2",
            VOLUNTEER_COLUMNS
        ))
        .bind(event_id)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Insert a volunteer grant. Unique per (event, member); a duplicate
    /// surfaces as a unique violation.
    pub async fn insert(
        &self,
        event_id: Uuid,
        member_id: Uuid,
        assigned_by: Uuid,
    ) -> Result<EventVolunteerEntity, sqlx::Error> {
        sqlx::query_as::<_, EventVolunteerEntity>(&format!(
            r#"
            INSERT INTO event_volunteers (event_id, member_id, assigned_by)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            VOLUNTEER_COLUMNS
        ))
        .bind(event_id)
        .bind(member_id)
        .bind(assigned_by)
        .fetch_one(&self.pool)
        .await
    }

    /// Remove a volunteer grant. Returns rows affected.
    pub async fn remove(&self, event_id: Uuid, member_id: Uuid) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM event_volunteers WHERE event_id = $1 AND member_id = $2")
                .bind(event_id)
                .bind(member_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Volunteers assigned to an event.
    pub async fn list_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<EventVolunteerEntity>, sqlx::Error> {
        sqlx::query_as::<_, EventVolunteerEntity>(&format!(
            "SELECT {} FROM event_volunteers WHERE event_id = $1 ORDER BY assigned_at ASC",
            VOLUNTEER_COLUMNS
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
    }
}
