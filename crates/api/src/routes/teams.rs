//! Serving team endpoints.
//!
//! Teams carry two generated tags (`<NAME>_LEADER`, `<NAME>_MEMBER`)
//! with the same rename-in-lockstep rules as families.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ManagerAuth;
use domain::models::team::{CreateTeamRequest, Team, UpdateTeamRequest};
use domain::services::tag_naming::{generated_tag_name, GeneratedRole};
use persistence::repositories::{MemberRepository, TeamRepository};

/// Body carrying the target member for leader/membership changes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberRequest {
    pub member_id: Uuid,
}

/// Create a team and its generated tags.
///
/// POST /api/v1/teams
pub async fn create_team(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Json(request): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    request.validate()?;

    let team = TeamRepository::new(state.pool.clone())
        .create_with_tags(&request.name, request.description.as_deref())
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23505") => {
                ApiError::Conflict("A team or tag with this name already exists".to_string())
            }
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(team.into())))
}

/// List teams.
///
/// GET /api/v1/teams
pub async fn list_teams(
    State(state): State<AppState>,
    _manager: ManagerAuth,
) -> Result<Json<Vec<Team>>, ApiError> {
    let teams = TeamRepository::new(state.pool.clone())
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(teams))
}

/// Update (possibly rename) a team; generated tags follow the rename.
///
/// PUT /api/v1/teams/:id
pub async fn update_team(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Path(team_id): Path<Uuid>,
    Json(request): Json<UpdateTeamRequest>,
) -> Result<Json<Team>, ApiError> {
    request.validate()?;

    let team = TeamRepository::new(state.pool.clone())
        .update_with_tags(team_id, request.name.as_deref(), request.description.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    Ok(Json(team.into()))
}

/// Assign the team leader (generated leader tag).
///
/// POST /api/v1/teams/:id/leader
pub async fn assign_leader(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path(team_id): Path<Uuid>,
    Json(request): Json<TeamMemberRequest>,
) -> Result<StatusCode, ApiError> {
    let team = TeamRepository::new(state.pool.clone())
        .find_by_id(team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    if MemberRepository::new(state.pool.clone())
        .find_by_id(request.member_id)
        .await?
        .filter(|m| m.is_active)
        .is_none()
    {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }

    state
        .tag_lifecycle()
        .assign_role_tag(
            request.member_id,
            &generated_tag_name(&team.name, GeneratedRole::Leader),
            Some(manager.member_id),
            None,
            None,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Add a member to the team (generated member tag).
///
/// POST /api/v1/teams/:id/members
pub async fn add_member(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path(team_id): Path<Uuid>,
    Json(request): Json<TeamMemberRequest>,
) -> Result<StatusCode, ApiError> {
    let team = TeamRepository::new(state.pool.clone())
        .find_by_id(team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    state
        .tag_lifecycle()
        .assign_role_tag(
            request.member_id,
            &generated_tag_name(&team.name, GeneratedRole::Member),
            Some(manager.member_id),
            None,
            None,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a member from the team.
///
/// DELETE /api/v1/teams/:id/members/:member_id
pub async fn remove_member(
    State(state): State<AppState>,
    ManagerAuth(manager): ManagerAuth,
    Path((team_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let team = TeamRepository::new(state.pool.clone())
        .find_by_id(team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    state
        .tag_lifecycle()
        .remove_role_tag(
            member_id,
            &generated_tag_name(&team.name, GeneratedRole::Member),
            Some(manager.member_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
