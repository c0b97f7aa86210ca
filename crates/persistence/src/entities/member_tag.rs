//! MemberTag entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::member_tag::{Actor, MemberTag};

/// Database row mapping for the member_tags table.
///
/// `assigned_by`/`removed_by` are nullable member ids; NULL means the
/// application itself acted.
#[derive(Debug, Clone, FromRow)]
pub struct MemberTagEntity {
    pub id: Uuid,
    pub member_id: Uuid,
    pub tag_id: Uuid,
    pub assigned_by: Option<Uuid>,
    pub assigned_at: DateTime<Utc>,
    pub removed_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_active: bool,
}

impl From<MemberTagEntity> for MemberTag {
    fn from(entity: MemberTagEntity) -> Self {
        // removed_by is only meaningful once a removal happened; a NULL
        // column on a removed row means the system removed it.
        let removed_by = entity
            .removed_at
            .map(|_| Actor::from_member_id(entity.removed_by));

        Self {
            id: entity.id,
            member_id: entity.member_id,
            tag_id: entity.tag_id,
            assigned_by: Actor::from_member_id(entity.assigned_by),
            assigned_at: entity.assigned_at,
            removed_by,
            removed_at: entity.removed_at,
            expires_at: entity.expires_at,
            notes: entity.notes,
            is_active: entity.is_active,
        }
    }
}

/// MemberTag row joined with its tag name, for history views.
#[derive(Debug, Clone, FromRow)]
pub struct MemberTagWithNameEntity {
    pub id: Uuid,
    pub member_id: Uuid,
    pub tag_id: Uuid,
    pub tag_name: String,
    pub assigned_by: Option<Uuid>,
    pub assigned_at: DateTime<Utc>,
    pub removed_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_active: bool,
}
