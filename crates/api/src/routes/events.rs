//! Event endpoints.
//!
//! Responses attach the derived UPCOMING/ONGOING/PAST status, computed
//! from the injected clock in the organizational timezone; it is never
//! stored.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ManagerAuth;
use crate::middleware::user_auth::MemberAuth;
use domain::models::event::{
    CreateEventRequest, Event, EventResponse, UpdateEventRequest,
};
use domain::services::event_status::derive_status;
use persistence::repositories::{EventPatch, EventRepository, NewEvent};
use shared::validation::parse_event_time;

fn to_response(state: &AppState, event: Event) -> EventResponse {
    let status = derive_status(
        &event,
        state.clock.now(),
        state.config.fellowship.tz_offset_hours,
    );
    EventResponse::from_event(event, status)
}

/// Create an event. Check-in starts closed; a manager opens it
/// separately from the schedule.
///
/// POST /api/v1/events
pub async fn create_event(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    request.validate()?;

    let start_time = parse_event_time(&request.start_time)
        .map_err(|_| ApiError::Validation("startTime must be HH:MM".to_string()))?;
    let end_time = parse_event_time(&request.end_time)
        .map_err(|_| ApiError::Validation("endTime must be HH:MM".to_string()))?;
    if end_time <= start_time {
        return Err(ApiError::Validation(
            "endTime must be after startTime".to_string(),
        ));
    }

    let event: Event = EventRepository::new(state.pool.clone())
        .create(NewEvent {
            name: &request.name,
            event_date: request.event_date,
            start_time,
            end_time,
            event_type: request.event_type.as_str(),
            venue: request.venue.as_deref(),
            allow_guest_checkin: request.allow_guest_checkin,
            is_recurring: request.is_recurring,
            recurrence_rule: request.recurrence_rule.as_deref(),
        })
        .await?
        .into();

    Ok((StatusCode::CREATED, Json(to_response(&state, event))))
}

/// List events, most recent first.
///
/// GET /api/v1/events
pub async fn list_events(
    State(state): State<AppState>,
    _auth: MemberAuth,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let events = EventRepository::new(state.pool.clone())
        .list(state.config.limits.event_list_limit)
        .await?
        .into_iter()
        .map(|entity| to_response(&state, entity.into()))
        .collect();
    Ok(Json(events))
}

/// Fetch one event with its derived status.
///
/// GET /api/v1/events/:event_id
pub async fn get_event(
    State(state): State<AppState>,
    _auth: MemberAuth,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventResponse>, ApiError> {
    let event: Event = EventRepository::new(state.pool.clone())
        .find_by_id(event_id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    Ok(Json(to_response(&state, event)))
}

/// Update an event, including the manual check-in gate (`isActive`).
///
/// PUT /api/v1/events/:event_id
pub async fn update_event(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Path(event_id): Path<Uuid>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    request.validate()?;

    let start_time = request
        .start_time
        .as_deref()
        .map(parse_event_time)
        .transpose()
        .map_err(|_| ApiError::Validation("startTime must be HH:MM".to_string()))?;
    let end_time = request
        .end_time
        .as_deref()
        .map(parse_event_time)
        .transpose()
        .map_err(|_| ApiError::Validation("endTime must be HH:MM".to_string()))?;

    // Validate the effective window before writing anything.
    let repo = EventRepository::new(state.pool.clone());
    let current = repo
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;
    let effective_start = start_time.unwrap_or(current.start_time);
    let effective_end = end_time.unwrap_or(current.end_time);
    if effective_end <= effective_start {
        return Err(ApiError::Validation(
            "endTime must be after startTime".to_string(),
        ));
    }

    let event_type = request.event_type.map(|t| t.as_str());
    let patch = EventPatch {
        name: request.name.as_deref(),
        event_date: request.event_date,
        start_time,
        end_time,
        event_type,
        venue: request.venue.as_deref(),
        is_active: request.is_active,
        allow_guest_checkin: request.allow_guest_checkin,
        is_recurring: request.is_recurring,
        recurrence_rule: request.recurrence_rule.as_deref(),
    };

    let event: Event = repo
        .update(event_id, patch)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    Ok(Json(to_response(&state, event)))
}

/// Close check-in for an event.
///
/// DELETE /api/v1/events/:event_id (soft: closes the gate, keeps the record)
pub async fn deactivate_event(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let affected = EventRepository::new(state.pool.clone())
        .set_active(event_id, false)
        .await?;
    if affected == 0 {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
