//! Self-registration endpoints: public submission, manager review.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ManagerAuth;
use domain::models::member::Member;
use domain::models::registration::{PendingRegistration, SelfRegisterRequest};
use persistence::repositories::{MemberRepository, NewRegistration, RegistrationRepository};

/// Submit a self-registration (public, no auth).
///
/// POST /api/v1/register
pub async fn submit_registration(
    State(state): State<AppState>,
    Json(request): Json<SelfRegisterRequest>,
) -> Result<(StatusCode, Json<PendingRegistration>), ApiError> {
    request.validate()?;

    if MemberRepository::new(state.pool.clone())
        .find_by_email(&request.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "A member with this email already exists".to_string(),
        ));
    }

    let registration = RegistrationRepository::new(state.pool.clone())
        .insert(NewRegistration {
            full_name: &request.full_name,
            email: &request.email,
            phone: request.phone.as_deref(),
            gender: &request.gender.to_string(),
            registered_on: request.registered_on,
            initial_year: request.initial_year,
            initial_semester: request.initial_semester,
            course_id: request.course_id,
            region_id: request.region_id,
            residence: request.residence.as_deref(),
            requested_tag_ids: &request.requested_tag_ids,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(registration.into())))
}

/// Query parameters for the registration listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRegistrationsQuery {
    /// PENDING, APPROVED or REJECTED; all when absent.
    pub status: Option<String>,
}

/// List self-registration submissions.
///
/// GET /api/v1/registrations?status=PENDING
pub async fn list_registrations(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Query(query): Query<ListRegistrationsQuery>,
) -> Result<Json<Vec<PendingRegistration>>, ApiError> {
    if let Some(status) = &query.status {
        if !matches!(status.as_str(), "PENDING" | "APPROVED" | "REJECTED") {
            return Err(ApiError::Validation(format!(
                "Unknown registration status: {}",
                status
            )));
        }
    }

    let registrations = RegistrationRepository::new(state.pool.clone())
        .list(query.status.as_deref())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(registrations))
}

/// Approve a pending registration: creates the member, assigns initial
/// tags, reconciles academic standing and queues the welcome email.
///
/// POST /api/v1/registrations/:id/approve
pub async fn approve_registration(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path(registration_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    let member = state
        .onboarding()
        .approve_registration(registration_id, manager.member_id)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Reject a pending registration.
///
/// POST /api/v1/registrations/:id/reject
pub async fn reject_registration(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path(registration_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .onboarding()
        .reject_registration(registration_id, manager.member_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
