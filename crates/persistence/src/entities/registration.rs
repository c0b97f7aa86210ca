//! Pending registration entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use domain::models::member::Gender;
use domain::models::registration::{PendingRegistration, RegistrationStatus};

/// Database row mapping for the pending_registrations table.
#[derive(Debug, Clone, FromRow)]
pub struct PendingRegistrationEntity {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: String,
    pub registered_on: Option<NaiveDate>,
    pub initial_year: Option<i32>,
    pub initial_semester: Option<i32>,
    pub course_id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    pub residence: Option<String>,
    pub requested_tag_ids: Vec<Uuid>,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl From<PendingRegistrationEntity> for PendingRegistration {
    fn from(entity: PendingRegistrationEntity) -> Self {
        Self {
            id: entity.id,
            full_name: entity.full_name,
            email: entity.email,
            phone: entity.phone,
            gender: Gender::from_str(&entity.gender).unwrap_or(Gender::Male), // Default fallback
            registered_on: entity.registered_on,
            initial_year: entity.initial_year,
            initial_semester: entity.initial_semester,
            course_id: entity.course_id,
            region_id: entity.region_id,
            residence: entity.residence,
            requested_tag_ids: entity.requested_tag_ids,
            status: RegistrationStatus::from_str(&entity.status)
                .unwrap_or(RegistrationStatus::Pending),
            submitted_at: entity.submitted_at,
            reviewed_by: entity.reviewed_by,
            reviewed_at: entity.reviewed_at,
        }
    }
}
