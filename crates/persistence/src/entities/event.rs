//! Event entity (database row mapping).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use domain::models::event::{Event, EventType};

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub name: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub event_type: String,
    pub venue: Option<String>,
    pub is_active: bool,
    pub allow_guest_checkin: bool,
    pub is_recurring: bool,
    pub recurrence_rule: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventEntity> for Event {
    fn from(entity: EventEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            event_date: entity.event_date,
            start_time: entity.start_time,
            end_time: entity.end_time,
            event_type: EventType::from_str(&entity.event_type).unwrap_or(EventType::Fellowship),
            venue: entity.venue,
            is_active: entity.is_active,
            allow_guest_checkin: entity.allow_guest_checkin,
            is_recurring: entity.is_recurring,
            recurrence_rule: entity.recurrence_rule,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
