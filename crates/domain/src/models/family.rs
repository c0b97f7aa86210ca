//! Family group domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A pastoral family group.
///
/// Creating a family generates its `<NAME>_HEAD` and `<NAME>_MEMBER` system
/// tags; renaming the family renames those tag rows in place so assignment
/// history survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a family.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFamilyRequest {
    #[validate(length(min = 2, max = 80, message = "Family name must be 2-80 characters"))]
    pub name: String,

    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<String>,
}

/// Request payload for updating (possibly renaming) a family.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFamilyRequest {
    #[validate(length(min = 2, max = 80, message = "Family name must be 2-80 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 255, message = "Description must be at most 255 characters"))]
    pub description: Option<String>,
}
