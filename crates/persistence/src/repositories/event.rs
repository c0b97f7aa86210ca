//! Event repository for database operations.

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::EventEntity;

const EVENT_COLUMNS: &str = "id, name, event_date, start_time, end_time, event_type, venue, \
     is_active, allow_guest_checkin, is_recurring, recurrence_rule, created_at, updated_at";

/// Insert payload for a new event row.
#[derive(Debug, Clone)]
pub struct NewEvent<'a> {
    pub name: &'a str,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub event_type: &'a str,
    pub venue: Option<&'a str>,
    pub allow_guest_checkin: bool,
    pub is_recurring: bool,
    pub recurrence_rule: Option<&'a str>,
}

/// Update payload; absent fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct EventPatch<'a> {
    pub name: Option<&'a str>,
    pub event_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub event_type: Option<&'a str>,
    pub venue: Option<&'a str>,
    pub is_active: Option<bool>,
    pub allow_guest_checkin: Option<bool>,
    pub is_recurring: Option<bool>,
    pub recurrence_rule: Option<&'a str>,
}

/// Repository for event-related database operations.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new EventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an event by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EventEntity>, sqlx::Error> {
        sqlx::query_as::<_, EventEntity>(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Insert a new event; check-in starts closed until a manager opens it.
    pub async fn create(&self, event: NewEvent<'_>) -> Result<EventEntity, sqlx::Error> {
        sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            INSERT INTO events (name, event_date, start_time, end_time, event_type, venue,
                                allow_guest_checkin, is_recurring, recurrence_rule)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(event.name)
        .bind(event.event_date)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.event_type)
        .bind(event.venue)
        .bind(event.allow_guest_checkin)
        .bind(event.is_recurring)
        .bind(event.recurrence_rule)
        .fetch_one(&self.pool)
        .await
    }

    /// Apply an event patch; absent fields keep their current value.
    pub async fn update(
        &self,
        id: Uuid,
        patch: EventPatch<'_>,
    ) -> Result<Option<EventEntity>, sqlx::Error> {
        sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            UPDATE events SET
                name = COALESCE($2, name),
                event_date = COALESCE($3, event_date),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                event_type = COALESCE($6, event_type),
                venue = COALESCE($7, venue),
                is_active = COALESCE($8, is_active),
                allow_guest_checkin = COALESCE($9, allow_guest_checkin),
                is_recurring = COALESCE($10, is_recurring),
                recurrence_rule = COALESCE($11, recurrence_rule),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.event_date)
        .bind(patch.start_time)
        .bind(patch.end_time)
        .bind(patch.event_type)
        .bind(patch.venue)
        .bind(patch.is_active)
        .bind(patch.allow_guest_checkin)
        .bind(patch.is_recurring)
        .bind(patch.recurrence_rule)
        .fetch_optional(&self.pool)
        .await
    }

    /// Open or close check-in for an event. Returns rows affected.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE events SET is_active = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(is_active)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// List events, most recent date first.
    pub async fn list(&self, limit: i64) -> Result<Vec<EventEntity>, sqlx::Error> {
        sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            SELECT {} FROM events
            ORDER BY event_date DESC, start_time DESC
            LIMIT $1
            "#,
            EVENT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Events scheduled on the given date.
    pub async fn list_on_date(&self, date: NaiveDate) -> Result<Vec<EventEntity>, sqlx::Error> {
        sqlx::query_as::<_, EventEntity>(&format!(
            r#"
            SELECT {} FROM events
            WHERE event_date = $1
            ORDER BY start_time ASC
            "#,
            EVENT_COLUMNS
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await
    }
}
