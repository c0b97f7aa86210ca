//! Member domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Member role within the fellowship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Member,
    Manager,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Manager => "manager",
        }
    }

    pub fn is_manager(&self) -> bool {
        matches!(self, Self::Manager)
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "manager" => Ok(Self::Manager),
            other => Err(format!("unknown member role: {}", other)),
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(format!("unknown gender: {}", other)),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => f.write_str("male"),
            Self::Female => f.write_str("female"),
        }
    }
}

/// Represents a registered fellowship member.
///
/// Members are never hard-deleted; `is_active = false` marks a soft delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Gender,
    pub fellowship_number: String,
    pub qr_code: String,
    pub role: MemberRole,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub registered_on: Option<NaiveDate>,
    pub initial_year: Option<i32>,
    pub initial_semester: Option<i32>,
    pub course_id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    pub residence: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub failed_login_attempts: i32,
    #[serde(skip_serializing)]
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// True when the lockout window is still open.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.map(|until| until > now).unwrap_or(false)
    }
}

/// Request payload for creating a member (manager-driven registration).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    #[validate(length(min = 2, max = 120, message = "Full name must be 2-120 characters"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 7, max = 20, message = "Phone must be 7-20 characters"))]
    pub phone: Option<String>,

    pub gender: Gender,

    /// Defaults to today when omitted.
    pub registered_on: Option<NaiveDate>,

    #[validate(range(min = 1, max = 8, message = "Year of study must be between 1 and 8"))]
    pub initial_year: Option<i32>,

    #[validate(range(min = 1, max = 2, message = "Semester must be 1 or 2"))]
    pub initial_semester: Option<i32>,

    pub course_id: Option<Uuid>,
    pub region_id: Option<Uuid>,

    #[validate(length(max = 120, message = "Residence must be at most 120 characters"))]
    pub residence: Option<String>,
}

/// Request payload for updating a member profile.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    #[validate(length(min = 2, max = 120, message = "Full name must be 2-120 characters"))]
    pub full_name: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[validate(length(min = 7, max = 20, message = "Phone must be 7-20 characters"))]
    pub phone: Option<String>,

    pub gender: Option<Gender>,
    pub registered_on: Option<NaiveDate>,

    #[validate(range(min = 1, max = 8, message = "Year of study must be between 1 and 8"))]
    pub initial_year: Option<i32>,

    #[validate(range(min = 1, max = 2, message = "Semester must be 1 or 2"))]
    pub initial_semester: Option<i32>,

    pub course_id: Option<Uuid>,
    pub region_id: Option<Uuid>,

    #[validate(length(max = 120, message = "Residence must be at most 120 characters"))]
    pub residence: Option<String>,
}

impl UpdateMemberRequest {
    /// True when the update touches a field that feeds academic standing,
    /// which forces a tag reconciliation pass afterwards.
    pub fn touches_academic_fields(&self) -> bool {
        self.registered_on.is_some()
            || self.initial_year.is_some()
            || self.initial_semester.is_some()
            || self.course_id.is_some()
    }
}

/// Lightweight member projection for the offline check-in roster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub id: Uuid,
    pub full_name: String,
    pub fellowship_number: String,
    pub phone: Option<String>,
    pub qr_code: String,
    pub region_id: Option<Uuid>,
}

impl From<Member> for MemberSummary {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            full_name: member.full_name,
            fellowship_number: member.fellowship_number,
            phone: member.phone,
            qr_code: member.qr_code,
            region_id: member.region_id,
        }
    }
}

/// Response payload for the academic status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicStatusResponse {
    pub current_year: Option<i32>,
    pub current_semester: Option<i32>,
    pub is_finalist: bool,
    pub is_alumni: bool,
    pub course: Option<super::course::CourseSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_member_role_parsing() {
        assert_eq!(MemberRole::from_str("member").unwrap(), MemberRole::Member);
        assert_eq!(MemberRole::from_str("manager").unwrap(), MemberRole::Manager);
        assert!(MemberRole::from_str("admin").is_err());
    }

    #[test]
    fn test_member_role_display_roundtrip() {
        for role in [MemberRole::Member, MemberRole::Manager] {
            assert_eq!(MemberRole::from_str(&role.to_string()).unwrap(), role);
        }
    }

    #[test]
    fn test_is_locked_window() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let mut member = sample_member();

        member.locked_until = None;
        assert!(!member.is_locked(now));

        member.locked_until = Some(now + chrono::Duration::minutes(5));
        assert!(member.is_locked(now));

        member.locked_until = Some(now - chrono::Duration::minutes(5));
        assert!(!member.is_locked(now));
    }

    #[test]
    fn test_touches_academic_fields() {
        let mut req = UpdateMemberRequest {
            full_name: Some("New Name".into()),
            email: None,
            phone: None,
            gender: None,
            registered_on: None,
            initial_year: None,
            initial_semester: None,
            course_id: None,
            region_id: None,
            residence: None,
        };
        assert!(!req.touches_academic_fields());

        req.initial_year = Some(2);
        assert!(req.touches_academic_fields());
    }

    fn sample_member() -> Member {
        Member {
            id: Uuid::new_v4(),
            full_name: "Jane Example".into(),
            email: "jane@example.org".into(),
            phone: None,
            gender: Gender::Female,
            fellowship_number: "ABC123".into(),
            qr_code: "fm_testtoken".into(),
            role: MemberRole::Member,
            password_hash: "$argon2id$stub".into(),
            registered_on: None,
            initial_year: None,
            initial_semester: None,
            course_id: None,
            region_id: None,
            residence: None,
            is_active: true,
            failed_login_attempts: 0,
            locked_until: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
