//! Tag endpoints: CRUD plus member assignment operations.
//!
//! System tags are protected: users cannot delete or rename them, only
//! adjust display fields.

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
use domain::models::member_tag::{AssignTagRequest, BulkTagRequest, MemberTag};
use domain::models::tag::{CreateTagRequest, Tag, TagType, UpdateTagRequest};
use persistence::repositories::TagRepository;

/// Query parameters for the tag listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTagsQuery {
    /// Restrict to tags offered on the registration form.
    #[serde(default)]
    pub registration_only: bool,
}

/// List tags.
///
/// GET /api/v1/tags
pub async fn list_tags(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Query(query): Query<ListTagsQuery>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    let repo = TagRepository::new(state.pool.clone());
    let tags = if query.registration_only {
        repo.list_show_on_registration().await?
    } else {
        repo.list_all().await?
    };
    Ok(Json(tags.into_iter().map(Into::into).collect()))
}

/// Tags offered on the public self-registration form.
///
/// GET /api/v1/tags/registration (no auth)
pub async fn registration_tags(
    State(state): State<AppState>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = TagRepository::new(state.pool.clone())
        .list_show_on_registration()
        .await?;
    Ok(Json(tags.into_iter().map(Into::into).collect()))
}

/// Create a custom tag.
///
/// POST /api/v1/tags
pub async fn create_tag(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Json(request): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    request.validate()?;

    let repo = TagRepository::new(state.pool.clone());
    if repo.find_by_name(&request.name).await?.is_some() {
        return Err(ApiError::Conflict(
            "A tag with this name already exists".to_string(),
        ));
    }

    let tag = repo
        .create(
            &request.name,
            request.description.as_deref(),
            &request.color,
            TagType::Custom.as_str(),
            false,
            request.show_on_registration,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(tag.into())))
}

/// Update a tag. Renames are refused for system tags (generated names
/// are owned by their parent family/team; seeded names are structural).
///
/// PUT /api/v1/tags/:tag_id
pub async fn update_tag(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Path(tag_id): Path<Uuid>,
    Json(request): Json<UpdateTagRequest>,
) -> Result<Json<Tag>, ApiError> {
    request.validate()?;

    let repo = TagRepository::new(state.pool.clone());
    let existing = repo
        .find_by_id(tag_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    if existing.is_system {
        if let Some(new_name) = &request.name {
            if *new_name != existing.name {
                return Err(ApiError::Forbidden(
                    "System tags cannot be renamed".to_string(),
                ));
            }
        }
    }

    let tag = repo
        .update(
            tag_id,
            request.name.as_deref(),
            request.description.as_deref(),
            request.color.as_deref(),
            request.show_on_registration,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    Ok(Json(tag.into()))
}

/// Delete a custom tag. System tags are protected.
///
/// DELETE /api/v1/tags/:tag_id
pub async fn delete_tag(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Path(tag_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = TagRepository::new(state.pool.clone());
    let existing = repo
        .find_by_id(tag_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    if existing.is_system {
        return Err(ApiError::Forbidden(
            "System tags cannot be deleted".to_string(),
        ));
    }

    repo.delete_custom(tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assign a tag to one member (idempotent).
///
/// POST /api/v1/tags/:tag_id/assign
pub async fn assign_tag(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path(tag_id): Path<Uuid>,
    Json(request): Json<AssignTagRequest>,
) -> Result<Json<MemberTag>, ApiError> {
    request.validate()?;
    let assignment = state
        .tag_lifecycle()
        .assign_tag_id(
            request.member_id,
            tag_id,
            Some(manager.member_id),
            request.expires_at,
            request.notes.as_deref(),
        )
        .await?;
    Ok(Json(assignment))
}

/// Remove a tag from one member (no-op when not assigned).
///
/// POST /api/v1/tags/:tag_id/remove
pub async fn remove_tag(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path(tag_id): Path<Uuid>,
    Json(request): Json<AssignTagRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .tag_lifecycle()
        .remove_tag_id(request.member_id, tag_id, Some(manager.member_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Outcome of a bulk assignment/removal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkTagResponse {
    pub processed: usize,
    pub errors: Vec<String>,
}

/// Assign a tag to many members; per-member failures are collected and
/// do not abort the batch.
///
/// POST /api/v1/tags/:tag_id/bulk-assign
pub async fn bulk_assign_tag(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path(tag_id): Path<Uuid>,
    Json(request): Json<BulkTagRequest>,
) -> Result<Json<BulkTagResponse>, ApiError> {
    request.validate()?;

    let service = state.tag_lifecycle();
    let mut processed = 0usize;
    let mut errors = Vec::new();

    for member_id in &request.member_ids {
        match service
            .assign_tag_id(
                *member_id,
                tag_id,
                Some(manager.member_id),
                request.expires_at,
                None,
            )
            .await
        {
            Ok(_) => processed += 1,
            Err(err) => errors.push(format!("{}: {}", member_id, err)),
        }
    }

    Ok(Json(BulkTagResponse { processed, errors }))
}

/// Remove a tag from many members.
///
/// POST /api/v1/tags/:tag_id/bulk-remove
pub async fn bulk_remove_tag(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path(tag_id): Path<Uuid>,
    Json(request): Json<BulkTagRequest>,
) -> Result<Json<BulkTagResponse>, ApiError> {
    request.validate()?;

    let service = state.tag_lifecycle();
    let mut processed = 0usize;
    let mut errors = Vec::new();

    for member_id in &request.member_ids {
        match service
            .remove_tag_id(*member_id, tag_id, Some(manager.member_id))
            .await
        {
            Ok(_) => processed += 1,
            Err(err) => errors.push(format!("{}: {}", member_id, err)),
        }
    }

    Ok(Json(BulkTagResponse { processed, errors }))
}
