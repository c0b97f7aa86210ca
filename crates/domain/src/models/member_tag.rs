//! MemberTag domain model: one assignment of a tag to a member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Who performed a tag assignment or removal.
///
/// Stored as a nullable member id; the absent case is the application
/// itself acting (reconciliation, expiry, first-attendance cleanup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", untagged)]
pub enum Actor {
    Member(Uuid),
    System,
}

impl Actor {
    pub fn member_id(&self) -> Option<Uuid> {
        match self {
            Self::Member(id) => Some(*id),
            Self::System => None,
        }
    }

    pub fn from_member_id(id: Option<Uuid>) -> Self {
        match id {
            Some(id) => Self::Member(id),
            None => Self::System,
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Member(id) => write!(f, "{}", id),
            Self::System => f.write_str("SYSTEM"),
        }
    }
}

/// One assignment of a [`super::tag::Tag`] to a [`super::member::Member`].
///
/// Assignments are deactivated, never physically deleted, so the rows double
/// as an assignment history. At most one *active* row may exist per
/// (member, tag) pair; every creation path checks for an existing active row
/// first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTag {
    pub id: Uuid,
    pub member_id: Uuid,
    pub tag_id: Uuid,
    pub assigned_by: Actor,
    pub assigned_at: DateTime<Utc>,
    pub removed_by: Option<Actor>,
    pub removed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub is_active: bool,
}

impl MemberTag {
    /// True when an expiry is set and has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }

    /// True when the assignment is active and not expired. An
    /// active-but-expired row is a transient inconsistency that readers
    /// correct lazily.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }
}

/// Request payload for assigning a tag to one member.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignTagRequest {
    pub member_id: Uuid,

    pub expires_at: Option<DateTime<Utc>>,

    #[validate(length(max = 255, message = "Notes must be at most 255 characters"))]
    pub notes: Option<String>,
}

/// Request payload for bulk tag assignment/removal.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkTagRequest {
    #[validate(length(min = 1, max = 500, message = "Provide between 1 and 500 member ids"))]
    pub member_ids: Vec<Uuid>,

    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(expires_at: Option<DateTime<Utc>>, is_active: bool) -> MemberTag {
        MemberTag {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            tag_id: Uuid::new_v4(),
            assigned_by: Actor::System,
            assigned_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            removed_by: None,
            removed_at: None,
            expires_at,
            notes: None,
            is_active,
        }
    }

    #[test]
    fn test_actor_member_id_mapping() {
        let id = Uuid::new_v4();
        assert_eq!(Actor::Member(id).member_id(), Some(id));
        assert_eq!(Actor::System.member_id(), None);
        assert_eq!(Actor::from_member_id(Some(id)), Actor::Member(id));
        assert_eq!(Actor::from_member_id(None), Actor::System);
    }

    #[test]
    fn test_actor_display() {
        assert_eq!(Actor::System.to_string(), "SYSTEM");
    }

    #[test]
    fn test_no_expiry_never_expires() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let tag = sample(None, true);
        assert!(!tag.is_expired(now));
        assert!(tag.is_live(now));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive_of_live() {
        let expiry = Utc.with_ymd_and_hms(2024, 3, 5, 20, 0, 0).unwrap();
        let tag = sample(Some(expiry), true);

        // One second before expiry: live.
        assert!(tag.is_live(expiry - chrono::Duration::seconds(1)));
        // At the expiry instant: no longer live.
        assert!(tag.is_expired(expiry));
        assert!(!tag.is_live(expiry));
    }

    #[test]
    fn test_inactive_row_is_never_live() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let tag = sample(None, false);
        assert!(!tag.is_live(now));
    }
}
