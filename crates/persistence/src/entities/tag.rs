//! Tag entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use domain::models::tag::{Tag, TagType};

/// Database row mapping for the tags table.
#[derive(Debug, Clone, FromRow)]
pub struct TagEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub tag_type: String,
    pub is_system: bool,
    pub show_on_registration: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TagEntity> for Tag {
    fn from(entity: TagEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            color: entity.color,
            tag_type: TagType::from_str(&entity.tag_type).unwrap_or(TagType::Custom),
            is_system: entity.is_system,
            show_on_registration: entity.show_on_registration,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
