//! Event volunteer endpoints.
//!
//! A volunteer grant and its CHECK_IN_VOLUNTEER tag move in lockstep:
//! assignment creates or refreshes the tag with expiry at the event's
//! end instant, removal deactivates it, and the event ending expires it
//! on its own.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ManagerAuth;
use crate::middleware::user_auth::MemberAuth;
use domain::models::event::Event;
use domain::models::tag::system_tags;
use domain::models::volunteer::{
    AssignVolunteerRequest, CheckPermissionResponse, EventVolunteer,
};
use domain::services::event_status::event_window_utc;
use persistence::repositories::{EventRepository, EventVolunteerRepository, MemberRepository};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

/// Grant a member check-in authority for an event.
///
/// POST /api/v1/events/:event_id/volunteers
pub async fn assign_volunteer(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path(event_id): Path<Uuid>,
    Json(request): Json<AssignVolunteerRequest>,
) -> Result<(StatusCode, Json<EventVolunteer>), ApiError> {
    let event: Event = EventRepository::new(state.pool.clone())
        .find_by_id(event_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    let member = MemberRepository::new(state.pool.clone())
        .find_by_id(request.member_id)
        .await?
        .filter(|m| m.is_active)
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    let volunteers = EventVolunteerRepository::new(state.pool.clone());
    let volunteer = match volunteers
        .insert(event_id, member.id, manager.member_id)
        .await
    {
        Ok(row) => row,
        Err(err) if is_unique_violation(&err) => {
            // Re-assignment refreshes the tag below instead of failing,
            // so a grant interrupted between the two writes can be
            // repaired by retrying.
            volunteers
                .find(event_id, member.id)
                .await?
                .ok_or_else(|| ApiError::Conflict("Volunteer already assigned".to_string()))?
        }
        Err(err) => return Err(err.into()),
    };

    // Tag expiry is the event's end instant; after that the grant reads
    // as inactive everywhere without further writes.
    let (_, end) = event_window_utc(&event, state.config.fellowship.tz_offset_hours);
    state
        .tag_lifecycle()
        .assign_role_tag(
            member.id,
            system_tags::CHECK_IN_VOLUNTEER,
            Some(manager.member_id),
            Some(end),
            None,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(volunteer.into())))
}

/// Revoke a member's check-in authority for an event.
///
/// DELETE /api/v1/events/:event_id/volunteers/:member_id
pub async fn remove_volunteer(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path((event_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let removed = EventVolunteerRepository::new(state.pool.clone())
        .remove(event_id, member_id)
        .await?;
    if removed == 0 {
        return Err(ApiError::NotFound("Volunteer assignment not found".to_string()));
    }

    state
        .tag_lifecycle()
        .remove_role_tag(
            member_id,
            system_tags::CHECK_IN_VOLUNTEER,
            Some(manager.member_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List volunteers for an event.
///
/// GET /api/v1/events/:event_id/volunteers
pub async fn list_volunteers(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<EventVolunteer>>, ApiError> {
    if EventRepository::new(state.pool.clone())
        .find_by_id(event_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }

    let volunteers = EventVolunteerRepository::new(state.pool.clone())
        .list_for_event(event_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(volunteers))
}

/// Probe whether the caller may operate check-in for an event.
///
/// GET /api/v1/events/:event_id/check-permission
pub async fn check_permission(
    State(state): State<AppState>,
    auth: MemberAuth,
    Path(event_id): Path<Uuid>,
) -> Result<Json<CheckPermissionResponse>, ApiError> {
    let response = state.checkin().check_permission(&auth, event_id).await?;
    Ok(Json(response))
}
