//! Rate limiting middleware.
//!
//! Per-member rate limiting on authenticated routes using a token-bucket
//! limiter. Must run AFTER authentication so the member id is available
//! in request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};
use serde_json::json;
use std::{
    collections::HashMap,
    num::NonZeroU32,
    sync::{Arc, RwLock},
};
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::user_auth::MemberAuth;

/// Type alias for the per-member rate limiter.
type MemberRateLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter state shared across all requests, keyed by member id.
pub struct RateLimiterState {
    limiters: RwLock<HashMap<Uuid, Arc<MemberRateLimiter>>>,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Create a new rate limiter state with the specified limit per minute.
    pub fn new(rate_limit_per_minute: u32) -> Self {
        Self {
            limiters: RwLock::new(HashMap::new()),
            rate_limit_per_minute,
        }
    }

    fn get_or_create_limiter(&self, member_id: Uuid) -> Arc<MemberRateLimiter> {
        {
            let limiters = self.limiters.read().unwrap();
            if let Some(limiter) = limiters.get(&member_id) {
                return limiter.clone();
            }
        }

        let mut limiters = self.limiters.write().unwrap();

        // Double-check in case another thread created it
        if let Some(limiter) = limiters.get(&member_id) {
            return limiter.clone();
        }

        let quota = Quota::per_minute(
            NonZeroU32::new(self.rate_limit_per_minute).unwrap_or(NonZeroU32::new(100).unwrap()),
        );
        let limiter = Arc::new(GovRateLimiter::direct(quota));
        limiters.insert(member_id, limiter.clone());
        limiter
    }

    /// Check whether a request from the given member should be allowed.
    /// Returns Err with retry-after seconds when rate limited.
    pub fn check(&self, member_id: Uuid) -> Result<(), u64> {
        let limiter = self.get_or_create_limiter(member_id);

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(governor::clock::Clock::now(
                    &governor::clock::DefaultClock::default(),
                ));
                Err(wait_time.as_secs().max(1))
            }
        }
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("active_limiters", &self.limiters.read().unwrap().len())
            .finish()
    }
}

/// Middleware that applies rate limiting per authenticated member.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(rate_limiter) = state.rate_limiter.as_ref() else {
        // Rate limiting disabled by configuration
        return next.run(req).await;
    };

    // The auth middleware ran first; routes without auth don't carry this
    // layer, so a missing extension just passes through.
    let Some(auth) = req.extensions().get::<MemberAuth>().cloned() else {
        return next.run(req).await;
    };

    match rate_limiter.check(auth.member_id) {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            let body = Json(json!({
                "error": "rate_limited",
                "message": "Too many requests. Please try again later.",
            }));
            let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
            if let Ok(value) = retry_after.to_string().parse() {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limiter_allows_within_quota() {
        let state = RateLimiterState::new(10);
        let member = Uuid::new_v4();
        for _ in 0..10 {
            assert!(state.check(member).is_ok());
        }
    }

    #[test]
    fn test_limiter_blocks_over_quota() {
        let state = RateLimiterState::new(3);
        let member = Uuid::new_v4();
        for _ in 0..3 {
            assert!(state.check(member).is_ok());
        }
        let retry_after = state.check(member).unwrap_err();
        assert!(retry_after >= 1);
    }

    #[test]
    fn test_limiters_are_per_member() {
        let state = RateLimiterState::new(1);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(state.check(a).is_ok());
        assert!(state.check(b).is_ok());
        assert!(state.check(a).is_err());
    }
}
