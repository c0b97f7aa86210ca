//! Member JWT authentication middleware.
//!
//! Validates the Bearer token on protected routes and stores the
//! authenticated member's identity in request extensions for handlers
//! and the rate limiter.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use crate::app::AppState;
use crate::config::JwtAuthConfig;
use domain::models::member::MemberRole;
use shared::jwt::JwtConfig;

/// Authenticated member information extracted from the JWT.
#[derive(Debug, Clone)]
pub struct MemberAuth {
    /// Member id from the subject claim.
    pub member_id: Uuid,
    /// Role at token issue time.
    pub role: MemberRole,
    /// JWT ID for session tracking.
    pub jti: String,
}

impl MemberAuth {
    /// True when the token carries the manager role.
    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    /// Validates an access token and returns member authentication info.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, String> {
        let claims = jwt_config
            .validate_access_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let member_id =
            Uuid::parse_str(&claims.sub).map_err(|_| "Invalid member id in token".to_string())?;

        let role = MemberRole::from_str(&claims.role)
            .map_err(|_| "Invalid role in token".to_string())?;

        Ok(MemberAuth {
            member_id,
            role,
            jti: claims.jti,
        })
    }

    /// Creates a JwtConfig from the application JWT settings.
    pub fn create_jwt_config(config: &JwtAuthConfig) -> Result<JwtConfig, String> {
        JwtConfig::with_leeway(
            &config.private_key,
            &config.public_key,
            config.access_token_expiry_secs,
            config.refresh_token_expiry_secs,
            config.leeway_secs,
        )
        .map_err(|e| format!("Failed to initialize JWT config: {}", e))
    }
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized", "message": message })),
    )
        .into_response()
}

fn internal_error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal_error", "message": message })),
    )
        .into_response()
}

/// Middleware that requires member JWT authentication.
pub async fn require_member_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&req) else {
        return unauthorized_response("Missing or invalid Authorization header");
    };

    let jwt_config = match MemberAuth::create_jwt_config(&state.config.jwt) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to create JWT config: {}", e);
            return internal_error_response("Authentication service unavailable");
        }
    };

    match MemberAuth::validate(&jwt_config, token) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(message) => unauthorized_response(&message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // HS256 token validation paths run through shared::jwt's own tests;
    // here we cover the auth info semantics.

    #[test]
    fn test_member_auth_is_manager() {
        let auth = MemberAuth {
            member_id: Uuid::new_v4(),
            role: MemberRole::Manager,
            jti: "jti".into(),
        };
        assert!(auth.is_manager());

        let auth = MemberAuth {
            member_id: Uuid::new_v4(),
            role: MemberRole::Member,
            jti: "jti".into(),
        };
        assert!(!auth.is_manager());
    }
}
