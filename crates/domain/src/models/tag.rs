//! Tag domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Well-known system tag names.
///
/// System tags are created programmatically (by migration or by entity
/// creation, in the case of generated family/team tags) and are protected
/// from user deletion and rename.
pub mod system_tags {
    /// Member is in the final year of their course.
    pub const FINALIST: &str = "FINALIST";
    /// Member has progressed past their course's final year.
    pub const ALUMNI: &str = "ALUMNI";
    /// Member has registered but never attended an event.
    pub const PENDING_FIRST_ATTENDANCE: &str = "PENDING_FIRST_ATTENDANCE";
    /// Member heads a family group.
    pub const FAMILY_HEAD: &str = "FAMILY_HEAD";
    /// Member may operate check-in for a specific event; always
    /// time-bounded to the event's end.
    pub const CHECK_IN_VOLUNTEER: &str = "CHECK_IN_VOLUNTEER";

    /// Tags seeded by migration, in creation order.
    pub const SEEDED: [&str; 5] = [
        FINALIST,
        ALUMNI,
        PENDING_FIRST_ATTENDANCE,
        FAMILY_HEAD,
        CHECK_IN_VOLUNTEER,
    ];
}

/// Whether a tag is application-managed or user-created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagType {
    System,
    Custom,
}

impl TagType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::Custom => "CUSTOM",
        }
    }
}

impl FromStr for TagType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SYSTEM" => Ok(Self::System),
            "CUSTOM" => Ok(Self::Custom),
            other => Err(format!("unknown tag type: {}", other)),
        }
    }
}

/// A named capability/classification label assignable to members.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub tag_type: TagType,
    /// Deletion guard; true for every application-managed tag.
    pub is_system: bool,
    /// Offered as a checkbox on the self-registration form.
    pub show_on_registration: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a custom tag.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagRequest {
    #[validate(length(min = 2, max = 64, message = "Tag name must be 2-64 characters"))]
    pub name: String,

    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "shared::validation::validate_hex_color"))]
    pub color: String,

    #[serde(default)]
    pub show_on_registration: bool,
}

/// Request payload for updating a custom tag.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTagRequest {
    #[validate(length(min = 2, max = 64, message = "Tag name must be 2-64 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "shared::validation::validate_hex_color"))]
    pub color: Option<String>,

    pub show_on_registration: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_type_roundtrip() {
        assert_eq!(TagType::from_str("SYSTEM").unwrap(), TagType::System);
        assert_eq!(TagType::from_str("CUSTOM").unwrap(), TagType::Custom);
        assert!(TagType::from_str("system").is_err());
        assert_eq!(TagType::System.as_str(), "SYSTEM");
    }

    #[test]
    fn test_seeded_tags_are_distinct() {
        let mut names = system_tags::SEEDED.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), system_tags::SEEDED.len());
    }
}
