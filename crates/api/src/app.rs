use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_member_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    attendance, auth, catalog, events, families, health, members, registrations, tags, teams,
    volunteers,
};
use crate::services::{
    AcademicService, CheckInService, EmailService, OnboardingService, SyncService,
    TagLifecycleService,
};
use shared::clock::{system_clock, SharedClock};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub clock: SharedClock,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
    pub email: EmailService,
}

impl AppState {
    /// Tag lifecycle service bound to this state's pool and clock.
    pub fn tag_lifecycle(&self) -> TagLifecycleService {
        TagLifecycleService::new(self.pool.clone(), self.clock.clone())
    }

    /// Academic assessment/reconciliation service.
    pub fn academic(&self) -> AcademicService {
        AcademicService::new(
            self.pool.clone(),
            self.clock.clone(),
            self.config.fellowship.tz_offset_hours,
            self.config.fellowship.semesters_per_year,
        )
    }

    /// Check-in admission service.
    pub fn checkin(&self) -> CheckInService {
        CheckInService::new(
            self.pool.clone(),
            self.clock.clone(),
            self.config.fellowship.tz_offset_hours,
        )
    }

    /// Offline batch sync service.
    pub fn sync(&self) -> SyncService {
        SyncService::new(self.pool.clone(), self.clock.clone())
    }

    /// Member onboarding service.
    pub fn onboarding(&self) -> OnboardingService {
        OnboardingService::new(
            self.pool.clone(),
            self.academic(),
            self.email.clone(),
            self.config.fellowship.number_prefix.clone(),
        )
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    create_app_with_clock(config, pool, system_clock())
}

/// App constructor with an injectable clock, so tests can pin "now".
pub fn create_app_with_clock(config: Config, pool: PgPool, clock: SharedClock) -> Router {
    let config = Arc::new(config);

    let rate_limiter = if config.security.rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.rate_limit_per_minute,
        )))
    } else {
        None
    };

    let state = AppState {
        pool,
        config: config.clone(),
        clock,
        rate_limiter,
        email: EmailService::new(config.email.clone()),
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Authenticated routes. Manager-only handlers enforce the role via
    // the ManagerAuth extractor, so member- and manager-level methods can
    // share paths in one router.
    let protected_routes = Router::new()
        .route("/api/v1/attendance/check-in", post(attendance::check_in))
        .route(
            "/api/v1/attendance/events/:event_id/offline-roster",
            get(attendance::offline_roster),
        )
        .route("/api/v1/events", get(events::list_events))
        .route("/api/v1/events/:event_id", get(events::get_event))
        .route(
            "/api/v1/events/:event_id/check-permission",
            get(volunteers::check_permission),
        )
        .route("/api/v1/members/:id", get(members::get_member))
        .route(
            "/api/v1/members/:id/academic-status",
            get(members::academic_status),
        )
        .route("/api/v1/courses", get(catalog::list_courses))
        .route("/api/v1/regions", get(catalog::list_regions))
        .route(
            "/api/v1/academic-periods",
            get(catalog::list_academic_periods),
        )
        .route(
            "/api/v1/attendance/guest-check-in",
            post(attendance::guest_check_in),
        )
        .route(
            "/api/v1/attendance/events/:event_id",
            get(attendance::list_event_attendance),
        )
        .route("/api/v1/members", post(members::create_member))
        .route("/api/v1/members", get(members::list_members))
        .route("/api/v1/members/:id", put(members::update_member))
        .route("/api/v1/members/:id", delete(members::delete_member))
        .route("/api/v1/members/:id/tags", get(members::member_tag_history))
        .route("/api/v1/events", post(events::create_event))
        .route("/api/v1/events/:event_id", put(events::update_event))
        .route("/api/v1/events/:event_id", delete(events::deactivate_event))
        .route(
            "/api/v1/events/:event_id/volunteers",
            post(volunteers::assign_volunteer),
        )
        .route(
            "/api/v1/events/:event_id/volunteers",
            get(volunteers::list_volunteers),
        )
        .route(
            "/api/v1/events/:event_id/volunteers/:member_id",
            delete(volunteers::remove_volunteer),
        )
        .route("/api/v1/tags", get(tags::list_tags))
        .route("/api/v1/tags", post(tags::create_tag))
        .route("/api/v1/tags/:tag_id", put(tags::update_tag))
        .route("/api/v1/tags/:tag_id", delete(tags::delete_tag))
        .route("/api/v1/tags/:tag_id/assign", post(tags::assign_tag))
        .route("/api/v1/tags/:tag_id/remove", post(tags::remove_tag))
        .route(
            "/api/v1/tags/:tag_id/bulk-assign",
            post(tags::bulk_assign_tag),
        )
        .route(
            "/api/v1/tags/:tag_id/bulk-remove",
            post(tags::bulk_remove_tag),
        )
        .route(
            "/api/v1/registrations",
            get(registrations::list_registrations),
        )
        .route(
            "/api/v1/registrations/:id/approve",
            post(registrations::approve_registration),
        )
        .route(
            "/api/v1/registrations/:id/reject",
            post(registrations::reject_registration),
        )
        .route("/api/v1/families", post(families::create_family))
        .route("/api/v1/families", get(families::list_families))
        .route("/api/v1/families/:id", put(families::update_family))
        .route("/api/v1/families/:id/head", post(families::assign_head))
        .route("/api/v1/families/:id/members", post(families::add_member))
        .route(
            "/api/v1/families/:id/members/:member_id",
            delete(families::remove_member),
        )
        .route("/api/v1/teams", post(teams::create_team))
        .route("/api/v1/teams", get(teams::list_teams))
        .route("/api/v1/teams/:id", put(teams::update_team))
        .route("/api/v1/teams/:id/leader", post(teams::assign_leader))
        .route("/api/v1/teams/:id/members", post(teams::add_member))
        .route(
            "/api/v1/teams/:id/members/:member_id",
            delete(teams::remove_member),
        )
        .route("/api/v1/courses", post(catalog::create_course))
        .route("/api/v1/regions", post(catalog::create_region))
        .route(
            "/api/v1/academic-periods",
            post(catalog::create_academic_period),
        )
        // Middleware order: auth runs first, then rate limiting (which
        // needs the member id the auth middleware stored).
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_member_auth,
        ));

    // Public routes (no authentication required). The sync-batch endpoint
    // is deliberately tolerant of missing auth: offline kiosks replay
    // long after their session expired, and the endpoint is idempotent.
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/register", post(registrations::submit_registration))
        .route("/api/v1/tags/registration", get(tags::registration_tags))
        .route("/api/v1/attendance/sync-batch", post(attendance::sync_batch));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
