//! Offline sync wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::attendance::CheckInMethod;

/// One offline-captured check-in, replayed against the server.
///
/// The timestamp is the client-observed scan time, which may be hours
/// before the replay; the server stores it as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecord {
    pub member_id: Uuid,
    pub event_id: Uuid,
    pub method: CheckInMethod,
    pub timestamp: DateTime<Utc>,
}

/// Batch of offline records submitted in one request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SyncBatchRequest {
    #[validate(length(min = 1, max = 1000, message = "Batch must contain 1-1000 records"))]
    pub records: Vec<SyncRecord>,
}

/// Per-record failure detail reported back to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncError {
    pub member_id: Uuid,
    pub event_id: Uuid,
    pub reason: String,
}

/// Batch outcome. Failures never abort the batch; they are collected here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncBatchResponse {
    pub synced_count: usize,
    pub total_received: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<SyncError>,
}
