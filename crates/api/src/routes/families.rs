//! Family group endpoints.
//!
//! Families carry two generated tags (`<NAME>_HEAD`, `<NAME>_MEMBER`).
//! Rename updates the tag rows in place; head assignment uses the
//! standard role-tag operations, so history and idempotency come for
//! free.

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
use domain::models::family::{CreateFamilyRequest, Family, UpdateFamilyRequest};
use domain::models::tag::system_tags;
use domain::services::tag_naming::{generated_tag_name, GeneratedRole};
use persistence::repositories::{FamilyRepository, MemberRepository};
use serde::Deserialize;

/// Body carrying the target member for head/membership changes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMemberRequest {
    pub member_id: Uuid,
}

/// Create a family and its generated tags.
///
/// POST /api/v1/families
pub async fn create_family(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Json(request): Json<CreateFamilyRequest>,
) -> Result<(StatusCode, Json<Family>), ApiError> {
    request.validate()?;

    let family = FamilyRepository::new(state.pool.clone())
        .create_with_tags(&request.name, request.description.as_deref())
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23505") => {
                ApiError::Conflict("A family or tag with this name already exists".to_string())
            }
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(family.into())))
}

/// List families.
///
/// GET /api/v1/families
pub async fn list_families(
    State(state): State<AppState>,
    _manager: ManagerAuth,
) -> Result<Json<Vec<Family>>, ApiError> {
    let families = FamilyRepository::new(state.pool.clone())
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(families))
}

/// Update (possibly rename) a family; generated tags follow the rename.
///
/// PUT /api/v1/families/:id
pub async fn update_family(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Path(family_id): Path<Uuid>,
    Json(request): Json<UpdateFamilyRequest>,
) -> Result<Json<Family>, ApiError> {
    request.validate()?;

    let family = FamilyRepository::new(state.pool.clone())
        .update_with_tags(family_id, request.name.as_deref(), request.description.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Family not found".to_string()))?;

    Ok(Json(family.into()))
}

/// Assign the family head: both the global FAMILY_HEAD tag and the
/// family's generated head tag.
///
/// POST /api/v1/families/:id/head
pub async fn assign_head(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path(family_id): Path<Uuid>,
    Json(request): Json<FamilyMemberRequest>,
) -> Result<StatusCode, ApiError> {
    let family = FamilyRepository::new(state.pool.clone())
        .find_by_id(family_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Family not found".to_string()))?;

    if MemberRepository::new(state.pool.clone())
        .find_by_id(request.member_id)
        .await?
        .filter(|m| m.is_active)
        .is_none()
    {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }

    let service = state.tag_lifecycle();
    service
        .assign_role_tag(
            request.member_id,
            &generated_tag_name(&family.name, GeneratedRole::Head),
            Some(manager.member_id),
            None,
            None,
        )
        .await?;
    service
        .assign_role_tag(
            request.member_id,
            system_tags::FAMILY_HEAD,
            Some(manager.member_id),
            None,
            None,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Add a member to the family (generated member tag).
///
/// POST /api/v1/families/:id/members
pub async fn add_member(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path(family_id): Path<Uuid>,
    Json(request): Json<FamilyMemberRequest>,
) -> Result<StatusCode, ApiError> {
    let family = FamilyRepository::new(state.pool.clone())
        .find_by_id(family_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Family not found".to_string()))?;

    state
        .tag_lifecycle()
        .assign_role_tag(
            request.member_id,
            &generated_tag_name(&family.name, GeneratedRole::Member),
            Some(manager.member_id),
            None,
            None,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a member from the family.
///
/// DELETE /api/v1/families/:id/members/:member_id
pub async fn remove_member(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path((family_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let family = FamilyRepository::new(state.pool.clone())
        .find_by_id(family_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Family not found".to_string()))?;

    state
        .tag_lifecycle()
        .remove_role_tag(
            member_id,
            &generated_tag_name(&family.name, GeneratedRole::Member),
            Some(manager.member_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
