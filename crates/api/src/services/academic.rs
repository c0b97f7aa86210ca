//! Academic status assessment and tag reconciliation orchestration.
//!
//! Gathers a member's academic inputs from the database, runs the pure
//! progression calculator, and converges the FINALIST/ALUMNI tags onto
//! the result. Runs after registration, approval, and any profile edit
//! touching academic fields; redundant runs are no-ops.

use chrono::FixedOffset;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::tag_lifecycle::TagLifecycleService;
use domain::models::course::CourseSummary;
use domain::models::member::AcademicStatusResponse;
use domain::services::academic::{assess, AcademicAssessment, AcademicProfile};
use domain::services::tag_policy::reconcile_academic_tags;
use persistence::repositories::{AcademicPeriodRepository, CourseRepository, MemberRepository};
use shared::clock::SharedClock;

/// Service computing academic standing and keeping tags in line with it.
#[derive(Clone)]
pub struct AcademicService {
    members: MemberRepository,
    courses: CourseRepository,
    periods: AcademicPeriodRepository,
    tag_lifecycle: TagLifecycleService,
    clock: SharedClock,
    tz_offset_hours: i32,
    semesters_per_year: i32,
}

impl AcademicService {
    /// Creates a new AcademicService over the given pool.
    pub fn new(
        pool: PgPool,
        clock: SharedClock,
        tz_offset_hours: i32,
        semesters_per_year: i32,
    ) -> Self {
        Self {
            members: MemberRepository::new(pool.clone()),
            courses: CourseRepository::new(pool.clone()),
            periods: AcademicPeriodRepository::new(pool.clone()),
            tag_lifecycle: TagLifecycleService::new(pool, clock.clone()),
            clock,
            tz_offset_hours,
            semesters_per_year,
        }
    }

    /// Today's date in the organizational timezone.
    fn local_today(&self) -> chrono::NaiveDate {
        let offset = FixedOffset::east_opt(self.tz_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
        self.clock.now().with_timezone(&offset).date_naive()
    }

    /// Assess a member's academic position. Missing inputs degrade to an
    /// unknown assessment; only a missing member errors.
    pub async fn assess_member(
        &self,
        member_id: Uuid,
    ) -> Result<(AcademicAssessment, Option<CourseSummary>), ApiError> {
        let member = self
            .members
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

        let course = match member.course_id {
            Some(course_id) => self.courses.find_by_id(course_id).await?,
            None => None,
        };

        let periods: Vec<_> = self
            .periods
            .list_ordered()
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let profile = AcademicProfile {
            registered_on: member.registered_on,
            initial_year: member.initial_year,
            initial_semester: member.initial_semester,
            course_duration_years: course.as_ref().map(|c| c.duration_years),
        };

        let assessment = assess(
            profile,
            &periods,
            self.local_today(),
            self.semesters_per_year,
        );

        let course_summary = course.map(|c| CourseSummary {
            id: c.id,
            name: c.name,
            duration_years: c.duration_years,
        });

        Ok((assessment, course_summary))
    }

    /// The academic-status endpoint payload for a member.
    pub async fn academic_status(
        &self,
        member_id: Uuid,
    ) -> Result<AcademicStatusResponse, ApiError> {
        let (assessment, course) = self.assess_member(member_id).await?;
        Ok(AcademicStatusResponse {
            current_year: assessment.current_year,
            current_semester: assessment.current_semester,
            is_finalist: assessment.standing.is_finalist(),
            is_alumni: assessment.standing.is_alumni(),
            course,
        })
    }

    /// Re-derive standing and converge the FINALIST/ALUMNI tags onto it.
    pub async fn reconcile_member_tags(
        &self,
        member_id: Uuid,
        actor: Option<Uuid>,
    ) -> Result<(), ApiError> {
        let (assessment, _) = self.assess_member(member_id).await?;
        let state = self.tag_lifecycle.academic_state(member_id).await?;
        let plan = reconcile_academic_tags(assessment.standing, state);
        self.tag_lifecycle
            .apply_academic_plan(member_id, &plan, actor)
            .await
    }
}
