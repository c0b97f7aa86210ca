//! Course domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A course of study a member can be enrolled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    /// Length of the course in academic years.
    pub duration_years: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Course projection embedded in member-facing responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: Uuid,
    pub name: String,
    pub duration_years: i32,
}

impl From<Course> for CourseSummary {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            name: course.name,
            duration_years: course.duration_years,
        }
    }
}

/// Request payload for creating a course.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[validate(length(min = 2, max = 120, message = "Course name must be 2-120 characters"))]
    pub name: String,

    #[validate(range(min = 1, max = 8, message = "Course duration must be 1-8 years"))]
    pub duration_years: i32,
}
