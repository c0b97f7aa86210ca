//! Attendance endpoints: check-in, guest check-in, offline roster and
//! the offline sync batch.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ManagerAuth;
use crate::middleware::user_auth::MemberAuth;
use domain::models::attendance::{
    CheckInRequest, CheckInResponse, GuestAttendance, GuestCheckInRequest,
};
use domain::models::member::MemberSummary;
use domain::models::sync::{SyncBatchRequest, SyncBatchResponse};
use persistence::repositories::{
    AttendanceRepository, EventRepository, GuestAttendanceRepository, MemberRepository,
};

/// Check a member into an event.
///
/// POST /api/v1/attendance/check-in
///
/// The operator must be a manager or a live volunteer for the event;
/// managers bypass the time-window check only.
pub async fn check_in(
    State(state): State<AppState>,
    operator: MemberAuth,
    Json(request): Json<CheckInRequest>,
) -> Result<(StatusCode, Json<CheckInResponse>), ApiError> {
    request.validate()?;
    let response = state.checkin().member_check_in(&operator, &request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Check a guest into an event. Manager-only; guests have no dedup key.
///
/// POST /api/v1/attendance/guest-check-in
pub async fn guest_check_in(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Json(request): Json<GuestCheckInRequest>,
) -> Result<(StatusCode, Json<GuestAttendance>), ApiError> {
    request.validate()?;
    let guest = state.checkin().guest_check_in(&request).await?;
    Ok((StatusCode::CREATED, Json(guest)))
}

/// Response for the offline roster endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineRosterResponse {
    pub event_id: Uuid,
    pub members: Vec<MemberSummary>,
}

/// Lightweight active-member roster for client-side caching before going
/// offline.
///
/// GET /api/v1/attendance/events/:event_id/offline-roster
pub async fn offline_roster(
    State(state): State<AppState>,
    _auth: MemberAuth,
    Path(event_id): Path<Uuid>,
) -> Result<Json<OfflineRosterResponse>, ApiError> {
    let events = EventRepository::new(state.pool.clone());
    if events.find_by_id(event_id).await?.is_none() {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }

    let members = MemberRepository::new(state.pool.clone())
        .offline_roster()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(OfflineRosterResponse { event_id, members }))
}

/// Replay a batch of offline check-ins.
///
/// POST /api/v1/attendance/sync-batch
///
/// Unauthenticated-tolerant and idempotent: duplicates are skipped, the
/// client-observed timestamps are preserved, and no time-window
/// validation applies.
pub async fn sync_batch(
    State(state): State<AppState>,
    Json(request): Json<SyncBatchRequest>,
) -> Result<Json<SyncBatchResponse>, ApiError> {
    request.validate()?;
    if request.records.len() > state.config.limits.max_sync_batch {
        return Err(ApiError::Validation(format!(
            "Batch exceeds the maximum of {} records",
            state.config.limits.max_sync_batch
        )));
    }

    let response = state.sync().process_batch(&request.records).await?;
    Ok(Json(response))
}

/// One row in the event attendance listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttendanceRow {
    pub member_id: Uuid,
    pub full_name: String,
    pub fellowship_number: String,
    pub method: String,
    pub checked_in_at: chrono::DateTime<chrono::Utc>,
}

/// Response for the event attendance listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttendanceResponse {
    pub event_id: Uuid,
    pub total: i64,
    pub attendance: Vec<EventAttendanceRow>,
    pub guests: Vec<GuestAttendance>,
}

/// Attendance roster for an event, members and guests.
///
/// GET /api/v1/attendance/events/:event_id
pub async fn list_event_attendance(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventAttendanceResponse>, ApiError> {
    let events = EventRepository::new(state.pool.clone());
    if events.find_by_id(event_id).await?.is_none() {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }

    let attendance_repo = AttendanceRepository::new(state.pool.clone());
    let total = attendance_repo.count_for_event(event_id).await?;
    let attendance = attendance_repo
        .list_for_event(event_id)
        .await?
        .into_iter()
        .map(|row| EventAttendanceRow {
            member_id: row.member_id,
            full_name: row.full_name,
            fellowship_number: row.fellowship_number,
            method: row.method,
            checked_in_at: row.checked_in_at,
        })
        .collect();

    let guests = GuestAttendanceRepository::new(state.pool.clone())
        .list_for_event(event_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(EventAttendanceResponse {
        event_id,
        total,
        attendance,
        guests,
    }))
}
