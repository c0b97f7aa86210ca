//! Reference data endpoints: courses, regions, academic periods.

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ManagerAuth;
use crate::middleware::user_auth::MemberAuth;
use domain::models::academic_period::{AcademicPeriod, CreateAcademicPeriodRequest};
use domain::models::course::{Course, CreateCourseRequest};
use persistence::entities::RegionEntity;
use persistence::repositories::{AcademicPeriodRepository, CourseRepository, RegionRepository};

/// Create a course.
///
/// POST /api/v1/courses
pub async fn create_course(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Json(request): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    request.validate()?;
    let course = CourseRepository::new(state.pool.clone())
        .create(&request.name, request.duration_years)
        .await?;
    Ok((StatusCode::CREATED, Json(course.into())))
}

/// List courses.
///
/// GET /api/v1/courses
pub async fn list_courses(
    State(state): State<AppState>,
    _auth: MemberAuth,
) -> Result<Json<Vec<Course>>, ApiError> {
    let courses = CourseRepository::new(state.pool.clone())
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(courses))
}

/// Request payload for creating a region.
#[derive(Debug, serde::Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegionRequest {
    #[validate(length(min = 2, max = 80, message = "Region name must be 2-80 characters"))]
    pub name: String,
}

/// Create a region.
///
/// POST /api/v1/regions
pub async fn create_region(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Json(request): Json<CreateRegionRequest>,
) -> Result<(StatusCode, Json<RegionEntity>), ApiError> {
    request.validate()?;
    let region = RegionRepository::new(state.pool.clone())
        .create(&request.name)
        .await?;
    Ok((StatusCode::CREATED, Json(region)))
}

/// List regions.
///
/// GET /api/v1/regions
pub async fn list_regions(
    State(state): State<AppState>,
    _auth: MemberAuth,
) -> Result<Json<Vec<RegionEntity>>, ApiError> {
    let regions = RegionRepository::new(state.pool.clone()).list().await?;
    Ok(Json(regions))
}

/// Configure an academic period.
///
/// POST /api/v1/academic-periods
pub async fn create_academic_period(
    State(state): State<AppState>,
    _manager: ManagerAuth,
    Json(request): Json<CreateAcademicPeriodRequest>,
) -> Result<(StatusCode, Json<AcademicPeriod>), ApiError> {
    request.validate()?;
    if !request.is_well_ordered() {
        return Err(ApiError::Validation(
            "startsOn must be before endsOn".to_string(),
        ));
    }

    let period = AcademicPeriodRepository::new(state.pool.clone())
        .create(&request.name, request.starts_on, request.ends_on)
        .await?;
    Ok((StatusCode::CREATED, Json(period.into())))
}

/// List academic periods in chronological order.
///
/// GET /api/v1/academic-periods
pub async fn list_academic_periods(
    State(state): State<AppState>,
    _auth: MemberAuth,
) -> Result<Json<Vec<AcademicPeriod>>, ApiError> {
    let periods = AcademicPeriodRepository::new(state.pool.clone())
        .list_ordered()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(periods))
}
