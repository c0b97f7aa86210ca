//! Extractors for authenticated member identity.
//!
//! The auth middleware validates the token and stores a
//! [`MemberAuth`] in request extensions; these extractors read it back
//! for handlers.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::MemberAuth;

#[async_trait]
impl FromRequestParts<AppState> for MemberAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<MemberAuth>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

/// Extractor asserting the manager role; use in handlers that need the
/// acting manager's identity beyond what the route guard enforces.
#[derive(Debug, Clone)]
pub struct ManagerAuth(pub MemberAuth);

#[async_trait]
impl FromRequestParts<AppState> for ManagerAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = MemberAuth::from_request_parts(parts, state).await?;
        if !auth.is_manager() {
            return Err(ApiError::Forbidden("Manager role required".to_string()));
        }
        Ok(ManagerAuth(auth))
    }
}
