//! Attendance entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use domain::models::attendance::{Attendance, CheckInMethod, GuestAttendance};

/// Database row mapping for the attendance table.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceEntity {
    pub id: Uuid,
    pub member_id: Uuid,
    pub event_id: Uuid,
    pub method: String,
    pub checked_in_at: DateTime<Utc>,
}

impl From<AttendanceEntity> for Attendance {
    fn from(entity: AttendanceEntity) -> Self {
        Self {
            id: entity.id,
            member_id: entity.member_id,
            event_id: entity.event_id,
            method: CheckInMethod::from_str(&entity.method).unwrap_or(CheckInMethod::Manual),
            checked_in_at: entity.checked_in_at,
        }
    }
}

/// Attendance row joined with member identity, for event rosters.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceWithMemberEntity {
    pub id: Uuid,
    pub member_id: Uuid,
    pub event_id: Uuid,
    pub method: String,
    pub checked_in_at: DateTime<Utc>,
    pub full_name: String,
    pub fellowship_number: String,
}

/// Database row mapping for the guest_attendance table.
#[derive(Debug, Clone, FromRow)]
pub struct GuestAttendanceEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub guest_name: String,
    pub guest_phone: Option<String>,
    pub purpose: Option<String>,
    pub checked_in_at: DateTime<Utc>,
}

impl From<GuestAttendanceEntity> for GuestAttendance {
    fn from(entity: GuestAttendanceEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            guest_name: entity.guest_name,
            guest_phone: entity.guest_phone,
            purpose: entity.purpose,
            checked_in_at: entity.checked_in_at,
        }
    }
}
