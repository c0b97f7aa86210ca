//! Check-in orchestration.
//!
//! Gathers the facts an admission decision needs (member resolution,
//! event state, operator authorization, duplicate pre-check), asks the
//! domain decision function for the verdict, and performs the attendance
//! insert plus first-timer tag cleanup on allow.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::metrics::record_check_in;
use crate::middleware::user_auth::MemberAuth;
use crate::services::tag_lifecycle::TagLifecycleService;
use domain::models::attendance::{
    CheckInRequest, CheckInResponse, GuestAttendance, GuestCheckInRequest,
};
use domain::models::event::Event;
use domain::models::member::{Member, MemberSummary};
use domain::models::tag::system_tags;
use domain::models::volunteer::CheckPermissionResponse;
use domain::services::admission::{decide, decide_guest, Admission, AdmissionFacts};
use persistence::repositories::{
    AttendanceRepository, EventRepository, EventVolunteerRepository, GuestAttendanceRepository,
    MemberRepository,
};
use shared::clock::SharedClock;

/// Maps an attendance-insert unique violation to the duplicate denial;
/// this is the race-safe path when two check-ins pass the pre-check
/// concurrently.
fn map_attendance_insert_error(err: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return ApiError::Conflict("Already checked in".to_string());
        }
    }
    err.into()
}

/// Service deciding and recording check-ins.
#[derive(Clone)]
pub struct CheckInService {
    members: MemberRepository,
    events: EventRepository,
    attendance: AttendanceRepository,
    guest_attendance: GuestAttendanceRepository,
    volunteers: EventVolunteerRepository,
    tag_lifecycle: TagLifecycleService,
    clock: SharedClock,
    tz_offset_hours: i32,
}

impl CheckInService {
    /// Creates a new CheckInService over the given pool.
    pub fn new(pool: PgPool, clock: SharedClock, tz_offset_hours: i32) -> Self {
        Self {
            members: MemberRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            attendance: AttendanceRepository::new(pool.clone()),
            guest_attendance: GuestAttendanceRepository::new(pool.clone()),
            volunteers: EventVolunteerRepository::new(pool.clone()),
            tag_lifecycle: TagLifecycleService::new(pool, clock.clone()),
            clock,
            tz_offset_hours,
        }
    }

    /// Resolve the member being checked in from the request credentials.
    async fn resolve_member(&self, request: &CheckInRequest) -> Result<Option<Member>, ApiError> {
        let entity = if let Some(qr_code) = &request.qr_code {
            self.members.find_by_qr_code(qr_code).await?
        } else if let Some(fellowship_number) = &request.fellowship_number {
            self.members
                .find_by_fellowship_number(fellowship_number)
                .await?
        } else {
            None
        };
        Ok(entity.map(Into::into))
    }

    /// Whether the operator may run check-in for this event as a
    /// volunteer: requires both the per-event grant and a live
    /// CHECK_IN_VOLUNTEER tag (the tag read heals expiry lazily).
    async fn operator_is_volunteer(
        &self,
        operator_id: Uuid,
        event_id: Uuid,
    ) -> Result<bool, ApiError> {
        if self.volunteers.find(event_id, operator_id).await?.is_none() {
            return Ok(false);
        }
        self.tag_lifecycle
            .has_active_tag(operator_id, system_tags::CHECK_IN_VOLUNTEER)
            .await
    }

    /// Member check-in: decide, record, clean up the first-timer tag.
    pub async fn member_check_in(
        &self,
        operator: &MemberAuth,
        request: &CheckInRequest,
    ) -> Result<CheckInResponse, ApiError> {
        if !request.has_identity() {
            return Err(ApiError::Validation(
                "qrCode or fellowshipNumber is required".to_string(),
            ));
        }

        let member = self.resolve_member(request).await?;
        let event: Option<Event> = self
            .events
            .find_by_id(request.event_id)
            .await?
            .map(Into::into);

        let actor_is_manager = operator.is_manager();
        let actor_is_volunteer = if actor_is_manager {
            false
        } else {
            self.operator_is_volunteer(operator.member_id, request.event_id)
                .await?
        };

        let already_checked_in = match (&member, &event) {
            (Some(member), Some(event)) => self
                .attendance
                .find_by_member_event(member.id, event.id)
                .await?
                .is_some(),
            _ => false,
        };

        let facts = AdmissionFacts {
            member: member.as_ref(),
            event: event.as_ref(),
            actor_is_manager,
            actor_is_volunteer,
            already_checked_in,
        };

        match decide(facts, self.clock.now(), self.tz_offset_hours) {
            Admission::Allow => {}
            Admission::Deny(reason) => return Err(reason.into()),
        }

        // The decision only allows with a resolved member and event.
        let Some(member) = member else {
            return Err(ApiError::Internal(
                "admission allowed without a resolved member".to_string(),
            ));
        };

        let attendance = self
            .attendance
            .insert(
                member.id,
                request.event_id,
                request.method.as_str(),
                self.clock.now(),
            )
            .await
            .map_err(map_attendance_insert_error)?;

        // First real attendance clears the pending-first-attendance
        // marker; the member themselves is recorded as the remover.
        let first_attendance = self
            .tag_lifecycle
            .remove_role_tag(
                member.id,
                system_tags::PENDING_FIRST_ATTENDANCE,
                Some(member.id),
            )
            .await?;

        record_check_in(request.method.as_str());
        info!(
            member_id = %member.id,
            event_id = %request.event_id,
            method = %request.method.as_str(),
            first_attendance,
            "Member checked in"
        );

        Ok(CheckInResponse {
            attendance: attendance.into(),
            member: MemberSummary::from(member),
            first_attendance,
        })
    }

    /// Guest check-in: only the manual gate and the guest flag apply.
    pub async fn guest_check_in(
        &self,
        request: &GuestCheckInRequest,
    ) -> Result<GuestAttendance, ApiError> {
        let event: Option<Event> = self
            .events
            .find_by_id(request.event_id)
            .await?
            .map(Into::into);

        match decide_guest(event.as_ref()) {
            Admission::Allow => {}
            Admission::Deny(reason) => return Err(reason.into()),
        }

        let guest = self
            .guest_attendance
            .insert(
                request.event_id,
                &request.guest_name,
                request.guest_phone.as_deref(),
                request.purpose.as_deref(),
                self.clock.now(),
            )
            .await?;

        info!(event_id = %request.event_id, "Guest checked in");
        Ok(guest.into())
    }

    /// Check-permission probe for the client's check-in screen.
    pub async fn check_permission(
        &self,
        operator: &MemberAuth,
        event_id: Uuid,
    ) -> Result<CheckPermissionResponse, ApiError> {
        if operator.is_manager() {
            return Ok(CheckPermissionResponse {
                has_permission: true,
                role: "manager".to_string(),
            });
        }

        if self
            .operator_is_volunteer(operator.member_id, event_id)
            .await?
        {
            Ok(CheckPermissionResponse {
                has_permission: true,
                role: "volunteer".to_string(),
            })
        } else {
            Ok(CheckPermissionResponse {
                has_permission: false,
                role: "none".to_string(),
            })
        }
    }
}
