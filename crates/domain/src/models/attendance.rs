//! Attendance domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// How a check-in was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckInMethod {
    Qr,
    FellowshipNumber,
    Manual,
}

impl CheckInMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qr => "QR",
            Self::FellowshipNumber => "FELLOWSHIP_NUMBER",
            Self::Manual => "MANUAL",
        }
    }
}

impl FromStr for CheckInMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QR" => Ok(Self::Qr),
            "FELLOWSHIP_NUMBER" => Ok(Self::FellowshipNumber),
            "MANUAL" => Ok(Self::Manual),
            other => Err(format!("unknown check-in method: {}", other)),
        }
    }
}

/// One check-in record; unique per (member, event).
///
/// The storage layer enforces the uniqueness; application pre-checks exist
/// only to produce a friendlier error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: Uuid,
    pub member_id: Uuid,
    pub event_id: Uuid,
    pub method: CheckInMethod,
    pub checked_in_at: DateTime<Utc>,
}

/// One guest check-in; guests have no dedup key and may check in freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestAttendance {
    pub id: Uuid,
    pub event_id: Uuid,
    pub guest_name: String,
    pub guest_phone: Option<String>,
    pub purpose: Option<String>,
    pub checked_in_at: DateTime<Utc>,
}

/// Request payload for a member check-in. Exactly one of `qr_code` /
/// `fellowship_number` identifies the member.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub qr_code: Option<String>,

    #[validate(custom(function = "shared::validation::validate_fellowship_number"))]
    pub fellowship_number: Option<String>,

    pub event_id: Uuid,
    pub method: CheckInMethod,
}

impl CheckInRequest {
    /// True when the request carries at least one identity credential.
    pub fn has_identity(&self) -> bool {
        self.qr_code.is_some() || self.fellowship_number.is_some()
    }
}

/// Request payload for a guest check-in.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GuestCheckInRequest {
    pub event_id: Uuid,

    #[validate(length(min = 2, max = 120, message = "Guest name must be 2-120 characters"))]
    pub guest_name: String,

    #[validate(length(min = 7, max = 20, message = "Phone must be 7-20 characters"))]
    pub guest_phone: Option<String>,

    #[validate(length(max = 255, message = "Purpose must be at most 255 characters"))]
    pub purpose: Option<String>,
}

/// Response payload for a successful member check-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub attendance: Attendance,
    pub member: super::member::MemberSummary,
    /// True when this was the member's first ever attendance (their
    /// pending-first-attendance tag was just cleared).
    pub first_attendance: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_roundtrip() {
        for method in [
            CheckInMethod::Qr,
            CheckInMethod::FellowshipNumber,
            CheckInMethod::Manual,
        ] {
            assert_eq!(CheckInMethod::from_str(method.as_str()).unwrap(), method);
        }
        assert!(CheckInMethod::from_str("CARRIER_PIGEON").is_err());
    }

    #[test]
    fn test_check_in_request_identity() {
        let mut req = CheckInRequest {
            qr_code: None,
            fellowship_number: None,
            event_id: Uuid::new_v4(),
            method: CheckInMethod::Qr,
        };
        assert!(!req.has_identity());

        req.fellowship_number = Some("ABC123".into());
        assert!(req.has_identity());
    }
}
