//! Academic period entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::academic_period::AcademicPeriod;

/// Database row mapping for the academic_periods table.
#[derive(Debug, Clone, FromRow)]
pub struct AcademicPeriodEntity {
    pub id: Uuid,
    pub name: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<AcademicPeriodEntity> for AcademicPeriod {
    fn from(entity: AcademicPeriodEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            starts_on: entity.starts_on,
            ends_on: entity.ends_on,
            created_at: entity.created_at,
        }
    }
}
