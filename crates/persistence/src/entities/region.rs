//! Region entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the regions table.
#[derive(Debug, Clone, FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionEntity {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
