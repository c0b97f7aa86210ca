//! Event volunteer domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Grants one member check-in authority for one event.
///
/// Kept in lockstep with a time-bounded CHECK_IN_VOLUNTEER member tag whose
/// expiry is the event's end instant: assignment creates or refreshes the
/// tag, removal (or the event ending) deactivates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventVolunteer {
    pub id: Uuid,
    pub event_id: Uuid,
    pub member_id: Uuid,
    pub assigned_by: Uuid,
    pub assigned_at: DateTime<Utc>,
}

/// Request payload for assigning a volunteer to an event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignVolunteerRequest {
    pub member_id: Uuid,
}

/// Response for the check-permission probe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPermissionResponse {
    pub has_permission: bool,
    /// "manager", "volunteer", or "none".
    pub role: String,
}
