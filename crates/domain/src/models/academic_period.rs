//! Academic period domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One configured semester/term window used to advance academic standing.
///
/// Periods are non-overlapping and chronologically ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicPeriod {
    pub id: Uuid,
    pub name: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Request payload for configuring an academic period.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAcademicPeriodRequest {
    #[validate(length(min = 2, max = 80, message = "Period name must be 2-80 characters"))]
    pub name: String,

    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

impl CreateAcademicPeriodRequest {
    /// Periods must span at least one day.
    pub fn is_well_ordered(&self) -> bool {
        self.starts_on < self.ends_on
    }
}
