//! Authentication endpoints: login with fellowship number + password.

use axum::{extract::State, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::MemberAuth;
use domain::models::member::Member;
use persistence::repositories::MemberRepository;
use shared::password::verify_password;

/// Login request payload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(custom(function = "shared::validation::validate_fellowship_number"))]
    pub fellowship_number: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token pair returned on successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub member_id: String,
    pub full_name: String,
    pub role: String,
}

/// Refresh request payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refreshed access token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

const INVALID_CREDENTIALS: &str = "Invalid fellowship number or password";

/// Log in with fellowship number and password.
///
/// POST /api/v1/auth/login
///
/// Failed attempts advance the lockout counter; once the configured
/// threshold is crossed, the account locks for the configured window.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let repo = MemberRepository::new(state.pool.clone());
    let now = state.clock.now();

    let member: Member = repo
        .find_by_fellowship_number(&request.fellowship_number)
        .await?
        .map(Into::into)
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !member.is_active {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    if member.is_locked(now) {
        return Err(ApiError::Forbidden(
            "Account is temporarily locked. Try again later.".to_string(),
        ));
    }

    let password_ok = verify_password(&request.password, &member.password_hash)?;
    if !password_ok {
        let threshold = state.config.fellowship.lockout_threshold;
        let lock = if member.failed_login_attempts + 1 >= threshold {
            Some(now + Duration::minutes(state.config.fellowship.lockout_minutes))
        } else {
            None
        };
        repo.record_login_failure(member.id, lock).await?;
        warn!(
            member_id = %member.id,
            attempts = member.failed_login_attempts + 1,
            locked = lock.is_some(),
            "Failed login attempt"
        );
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    repo.clear_login_failures(member.id).await?;

    let jwt_config = MemberAuth::create_jwt_config(&state.config.jwt)
        .map_err(ApiError::Internal)?;
    let (access_token, _) = jwt_config
        .generate_access_token(member.id, member.role.as_str())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let (refresh_token, _) = jwt_config
        .generate_refresh_token(member.id, member.role.as_str())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(member_id = %member.id, "Member logged in");

    Ok(Json(LoginResponse {
        access_token,
        refresh_token,
        member_id: member.id.to_string(),
        full_name: member.full_name,
        role: member.role.to_string(),
    }))
}

/// Exchange a refresh token for a new access token.
///
/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let jwt_config = MemberAuth::create_jwt_config(&state.config.jwt)
        .map_err(ApiError::Internal)?;

    let claims = jwt_config
        .validate_refresh_token(&request.refresh_token)
        .map_err(|e| ApiError::Unauthorized(format!("Invalid refresh token: {}", e)))?;

    let member_id = shared::jwt::extract_member_id(&claims)
        .map_err(|_| ApiError::Unauthorized("Invalid refresh token".to_string()))?;

    // Re-read the member so a role change or soft delete invalidates the
    // refresh chain.
    let repo = MemberRepository::new(state.pool.clone());
    let member: Member = repo
        .find_by_id(member_id)
        .await?
        .map(Into::into)
        .filter(|m: &Member| m.is_active)
        .ok_or_else(|| ApiError::Unauthorized("Account is no longer active".to_string()))?;

    let (access_token, _) = jwt_config
        .generate_access_token(member.id, member.role.as_str())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(RefreshResponse { access_token }))
}
