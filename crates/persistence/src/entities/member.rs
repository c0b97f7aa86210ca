//! Member entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use domain::models::member::{Gender, Member, MemberRole, MemberSummary};

/// Database row mapping for the members table.
#[derive(Debug, Clone, FromRow)]
pub struct MemberEntity {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: String,
    pub fellowship_number: String,
    pub qr_code: String,
    pub role: String,
    pub password_hash: String,
    pub registered_on: Option<NaiveDate>,
    pub initial_year: Option<i32>,
    pub initial_semester: Option<i32>,
    pub course_id: Option<Uuid>,
    pub region_id: Option<Uuid>,
    pub residence: Option<String>,
    pub is_active: bool,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MemberEntity> for Member {
    fn from(entity: MemberEntity) -> Self {
        Self {
            id: entity.id,
            full_name: entity.full_name,
            email: entity.email,
            phone: entity.phone,
            gender: Gender::from_str(&entity.gender).unwrap_or(Gender::Male), // Default fallback
            fellowship_number: entity.fellowship_number,
            qr_code: entity.qr_code,
            role: MemberRole::from_str(&entity.role).unwrap_or(MemberRole::Member),
            password_hash: entity.password_hash,
            registered_on: entity.registered_on,
            initial_year: entity.initial_year,
            initial_semester: entity.initial_semester,
            course_id: entity.course_id,
            region_id: entity.region_id,
            residence: entity.residence,
            is_active: entity.is_active,
            failed_login_attempts: entity.failed_login_attempts,
            locked_until: entity.locked_until,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Row mapping for the offline roster projection.
#[derive(Debug, Clone, FromRow)]
pub struct MemberRosterEntity {
    pub id: Uuid,
    pub full_name: String,
    pub fellowship_number: String,
    pub phone: Option<String>,
    pub qr_code: String,
    pub region_id: Option<Uuid>,
}

impl From<MemberRosterEntity> for MemberSummary {
    fn from(entity: MemberRosterEntity) -> Self {
        Self {
            id: entity.id,
            full_name: entity.full_name,
            fellowship_number: entity.fellowship_number,
            phone: entity.phone,
            qr_code: entity.qr_code,
            region_id: entity.region_id,
        }
    }
}
