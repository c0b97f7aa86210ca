//! Member endpoints: CRUD, academic status, tag history.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ManagerAuth;
use crate::middleware::user_auth::MemberAuth;
use domain::models::member::{
    AcademicStatusResponse, CreateMemberRequest, Member, UpdateMemberRequest,
};
use domain::models::member_tag::Actor;
use persistence::repositories::{MemberProfilePatch, MemberRepository, MemberTagRepository};
use shared::pagination::{decode_cursor, encode_cursor};

/// Query parameters for the member listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMembersQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

/// Paginated member listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMembersResponse {
    pub members: Vec<Member>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Create a member directly (manager-driven registration).
///
/// POST /api/v1/members
pub async fn create_member(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Json(request): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    request.validate()?;
    let member = state
        .onboarding()
        .create_member(&request, &[], Some(manager.member_id))
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// List active members with cursor pagination.
///
/// GET /api/v1/members?cursor=...&limit=...
pub async fn list_members(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Query(query): Query<ListMembersQuery>,
) -> Result<Json<ListMembersResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(state.config.limits.default_page_size)
        .clamp(1, state.config.limits.max_page_size);

    let after = match &query.cursor {
        Some(cursor) => Some(
            decode_cursor(cursor)
                .map_err(|e| ApiError::Validation(format!("Invalid cursor: {}", e)))?,
        ),
        None => None,
    };

    let repo = MemberRepository::new(state.pool.clone());
    // Fetch one extra row to know whether another page exists.
    let mut entities = repo.list_active(after, limit + 1).await?;

    let next_cursor = if entities.len() as i64 > limit {
        entities.truncate(limit as usize);
        entities
            .last()
            .map(|m| encode_cursor(m.created_at, m.id))
    } else {
        None
    };

    Ok(Json(ListMembersResponse {
        members: entities.into_iter().map(Into::into).collect(),
        next_cursor,
    }))
}

/// Fetch one member. Members may read themselves; managers anyone.
///
/// GET /api/v1/members/:id
pub async fn get_member(
    State(state): State<AppState>,
    auth: MemberAuth,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Member>, ApiError> {
    if !auth.is_manager() && auth.member_id != member_id {
        return Err(ApiError::Forbidden(
            "Cannot view another member's profile".to_string(),
        ));
    }

    let member: Member = MemberRepository::new(state.pool.clone())
        .find_by_id(member_id)
        .await?
        .map(Into::into)
        .filter(|m: &Member| m.is_active)
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    Ok(Json(member))
}

/// Update a member profile. Touching any academic field re-runs the
/// academic tag reconciliation afterwards.
///
/// PUT /api/v1/members/:id
pub async fn update_member(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path(member_id): Path<Uuid>,
    Json(request): Json<UpdateMemberRequest>,
) -> Result<Json<Member>, ApiError> {
    request.validate()?;

    let gender = request.gender.map(|g| g.to_string());
    let patch = MemberProfilePatch {
        full_name: request.full_name.as_deref(),
        email: request.email.as_deref(),
        phone: request.phone.as_deref(),
        gender: gender.as_deref(),
        registered_on: request.registered_on,
        initial_year: request.initial_year,
        initial_semester: request.initial_semester,
        course_id: request.course_id,
        region_id: request.region_id,
        residence: request.residence.as_deref(),
    };

    let member: Member = MemberRepository::new(state.pool.clone())
        .update_profile(member_id, patch)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    if request.touches_academic_fields() {
        state
            .academic()
            .reconcile_member_tags(member_id, Some(manager.member_id))
            .await?;
    }

    Ok(Json(member))
}

/// Soft-delete a member.
///
/// DELETE /api/v1/members/:id
pub async fn delete_member(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Path(member_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let affected = MemberRepository::new(state.pool.clone())
        .soft_delete(member_id)
        .await?;
    if affected == 0 {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Academic standing for a member.
///
/// GET /api/v1/members/:id/academic-status
pub async fn academic_status(
    State(state): State<AppState>,
    auth: MemberAuth,
    Path(member_id): Path<Uuid>,
) -> Result<Json<AcademicStatusResponse>, ApiError> {
    if !auth.is_manager() && auth.member_id != member_id {
        return Err(ApiError::Forbidden(
            "Cannot view another member's academic status".to_string(),
        ));
    }

    let status = state.academic().academic_status(member_id).await?;
    Ok(Json(status))
}

/// One row in a member's tag history.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTagHistoryRow {
    pub tag_id: Uuid,
    pub tag_name: String,
    pub assigned_by: Actor,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
    pub removed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub notes: Option<String>,
    pub is_active: bool,
}

/// Tag assignment history for a member, newest first.
///
/// GET /api/v1/members/:id/tags
pub async fn member_tag_history(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<MemberTagHistoryRow>>, ApiError> {
    let rows = MemberTagRepository::new(state.pool.clone())
        .history_for_member(member_id)
        .await?
        .into_iter()
        .map(|row| MemberTagHistoryRow {
            tag_id: row.tag_id,
            tag_name: row.tag_name,
            assigned_by: Actor::from_member_id(row.assigned_by),
            assigned_at: row.assigned_at,
            removed_at: row.removed_at,
            expires_at: row.expires_at,
            notes: row.notes,
            is_active: row.is_active,
        })
        .collect();

    Ok(Json(rows))
}
