//! Self-registration domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::member::Gender;

/// Review state of a self-registration submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(format!("unknown registration status: {}", other)),
        }
    }
}

/// A self-registration submission awaiting manager review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRegistration {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Gender,
    pub registered_on: Option<NaiveDate>,
    pub initial_year: Option<i32>,
    pub initial_semester: Option<i32>,
    pub course_id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    pub residence: Option<String>,
    /// Tags the applicant ticked on the registration form; only
    /// show-on-registration tags are honored at approval time.
    pub requested_tag_ids: Vec<Uuid>,
    pub status: RegistrationStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Public self-registration form payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SelfRegisterRequest {
    #[validate(length(min = 2, max = 120, message = "Full name must be 2-120 characters"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 7, max = 20, message = "Phone must be 7-20 characters"))]
    pub phone: Option<String>,

    pub gender: Gender,

    pub registered_on: Option<NaiveDate>,

    #[validate(range(min = 1, max = 8, message = "Year of study must be between 1 and 8"))]
    pub initial_year: Option<i32>,

    #[validate(range(min = 1, max = 2, message = "Semester must be 1 or 2"))]
    pub initial_semester: Option<i32>,

    pub course_id: Option<Uuid>,
    pub region_id: Option<Uuid>,

    #[validate(length(max = 120, message = "Residence must be at most 120 characters"))]
    pub residence: Option<String>,

    #[serde(default)]
    pub requested_tag_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            RegistrationStatus::Pending,
            RegistrationStatus::Approved,
            RegistrationStatus::Rejected,
        ] {
            assert_eq!(
                RegistrationStatus::from_str(status.as_str()).unwrap(),
                status
            );
        }
        assert!(RegistrationStatus::from_str("WAITLISTED").is_err());
    }
}
