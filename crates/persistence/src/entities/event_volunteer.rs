//! Event volunteer entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::volunteer::EventVolunteer;

/// Database row mapping for the event_volunteers table.
#[derive(Debug, Clone, FromRow)]
pub struct EventVolunteerEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub member_id: Uuid,
    pub assigned_by: Uuid,
    pub assigned_at: DateTime<Utc>,
}

impl From<EventVolunteerEntity> for EventVolunteer {
    fn from(entity: EventVolunteerEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            member_id: entity.member_id,
            assigned_by: entity.assigned_by,
            assigned_at: entity.assigned_at,
        }
    }
}
