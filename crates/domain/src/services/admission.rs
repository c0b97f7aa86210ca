//! Check-in admission control.
//!
//! A pure decision function over already-resolved facts. The HTTP layer
//! gathers the member, event, authorization and duplicate lookups, then
//! asks this module for the verdict; checks run in a fixed order and the
//! first failure wins.

use chrono::{DateTime, Utc};

use crate::models::event::Event;
use crate::models::member::Member;
use crate::services::event_status::in_event_window;

/// Why a check-in attempt was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No member matched the QR code / fellowship number, or the match is
    /// soft-deleted. Ambiguity fails closed.
    MemberNotFound,
    EventNotFound,
    /// The event's manual check-in gate is off.
    CheckInClosed,
    /// Actor is neither a manager nor a live volunteer for this event.
    NotAuthorized,
    /// Outside the event's scheduled window (non-managers only).
    OutsideEventWindow,
    AlreadyCheckedIn,
}

impl DenyReason {
    /// Human-readable denial reason; clients display this verbatim.
    pub fn message(&self) -> &'static str {
        match self {
            Self::MemberNotFound => "Member not found",
            Self::EventNotFound => "Event not found",
            Self::CheckInClosed => "Check-in is not open for this event",
            Self::NotAuthorized => "Not authorized to check in for this event",
            Self::OutsideEventWindow => "Not within the event time window",
            Self::AlreadyCheckedIn => "Already checked in",
        }
    }
}

/// Outcome of an admission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Deny(DenyReason),
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Resolved facts an admission decision is made from.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionFacts<'a> {
    /// The member being checked in, if identity resolution succeeded.
    pub member: Option<&'a Member>,
    /// The target event, if it exists.
    pub event: Option<&'a Event>,
    /// The operating actor holds the manager role.
    pub actor_is_manager: bool,
    /// The operating actor holds a live check-in volunteer tag for this
    /// event (expiry already accounted for by the tag read).
    pub actor_is_volunteer: bool,
    /// An attendance row already exists for (member, event).
    pub already_checked_in: bool,
}

/// Decides a member check-in attempt.
///
/// Managers bypass the time-window check only; every other rule applies
/// to them unchanged.
pub fn decide(
    facts: AdmissionFacts<'_>,
    now: DateTime<Utc>,
    tz_offset_hours: i32,
) -> Admission {
    match facts.member {
        Some(member) if member.is_active => {}
        _ => return Admission::Deny(DenyReason::MemberNotFound),
    }

    let event = match facts.event {
        Some(event) => event,
        None => return Admission::Deny(DenyReason::EventNotFound),
    };

    if !event.is_active {
        return Admission::Deny(DenyReason::CheckInClosed);
    }

    if !facts.actor_is_manager && !facts.actor_is_volunteer {
        return Admission::Deny(DenyReason::NotAuthorized);
    }

    if !facts.actor_is_manager && !in_event_window(event, now, tz_offset_hours) {
        return Admission::Deny(DenyReason::OutsideEventWindow);
    }

    if facts.already_checked_in {
        return Admission::Deny(DenyReason::AlreadyCheckedIn);
    }

    Admission::Allow
}

/// Decides a guest check-in: only the manual gate and the guest flag
/// apply. Guests have no identity and no dedup key.
pub fn decide_guest(event: Option<&Event>) -> Admission {
    let event = match event {
        Some(event) => event,
        None => return Admission::Deny(DenyReason::EventNotFound),
    };

    if !event.is_active {
        return Admission::Deny(DenyReason::CheckInClosed);
    }

    if !event.allow_guest_checkin {
        return Admission::Deny(DenyReason::NotAuthorized);
    }

    Admission::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventType;
    use crate::models::member::{Gender, MemberRole};
    use chrono::{NaiveDate, NaiveTime, TimeZone};
    use uuid::Uuid;

    fn member(active: bool) -> Member {
        Member {
            id: Uuid::new_v4(),
            full_name: "Checked-in Member".into(),
            email: "member@example.org".into(),
            phone: None,
            gender: Gender::Male,
            fellowship_number: "ABC123".into(),
            qr_code: "fm_token".into(),
            role: MemberRole::Member,
            password_hash: "$argon2id$stub".into(),
            registered_on: None,
            initial_year: None,
            initial_semester: None,
            course_id: None,
            region_id: None,
            residence: None,
            is_active: active,
            failed_login_attempts: 0,
            locked_until: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn event(active: bool, guests: bool) -> Event {
        Event {
            id: Uuid::new_v4(),
            name: "Friday Fellowship".into(),
            event_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            event_type: EventType::Fellowship,
            venue: None,
            is_active: active,
            allow_guest_checkin: guests,
            is_recurring: false,
            recurrence_rule: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// 19:00 EAT on the event day.
    fn during_event() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 16, 0, 0).unwrap()
    }

    /// 20:05 EAT, five minutes after the event ends.
    fn after_event() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 17, 5, 0).unwrap()
    }

    fn facts<'a>(member: Option<&'a Member>, event: Option<&'a Event>) -> AdmissionFacts<'a> {
        AdmissionFacts {
            member,
            event,
            actor_is_manager: false,
            actor_is_volunteer: true,
            already_checked_in: false,
        }
    }

    #[test]
    fn test_allow_happy_path() {
        let m = member(true);
        let e = event(true, false);
        let decision = decide(facts(Some(&m), Some(&e)), during_event(), 3);
        assert_eq!(decision, Admission::Allow);
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_member_not_found_wins_over_everything() {
        let e = event(false, false); // also inactive
        let decision = decide(facts(None, Some(&e)), during_event(), 3);
        assert_eq!(decision, Admission::Deny(DenyReason::MemberNotFound));
    }

    #[test]
    fn test_soft_deleted_member_fails_closed() {
        let m = member(false);
        let e = event(true, false);
        let decision = decide(facts(Some(&m), Some(&e)), during_event(), 3);
        assert_eq!(decision, Admission::Deny(DenyReason::MemberNotFound));
    }

    #[test]
    fn test_event_not_found() {
        let m = member(true);
        let decision = decide(facts(Some(&m), None), during_event(), 3);
        assert_eq!(decision, Admission::Deny(DenyReason::EventNotFound));
    }

    #[test]
    fn test_inactive_event_closed_before_authorization() {
        let m = member(true);
        let e = event(false, false);
        let mut f = facts(Some(&m), Some(&e));
        f.actor_is_volunteer = false; // would also fail auth
        let decision = decide(f, during_event(), 3);
        assert_eq!(decision, Admission::Deny(DenyReason::CheckInClosed));
    }

    #[test]
    fn test_unauthorized_actor() {
        let m = member(true);
        let e = event(true, false);
        let mut f = facts(Some(&m), Some(&e));
        f.actor_is_volunteer = false;
        let decision = decide(f, during_event(), 3);
        assert_eq!(decision, Admission::Deny(DenyReason::NotAuthorized));
    }

    #[test]
    fn test_volunteer_outside_window_denied() {
        let m = member(true);
        let e = event(true, false);
        let decision = decide(facts(Some(&m), Some(&e)), after_event(), 3);
        assert_eq!(decision, Admission::Deny(DenyReason::OutsideEventWindow));
    }

    #[test]
    fn test_window_boundaries() {
        let m = member(true);
        let e = event(true, false);
        let f = facts(Some(&m), Some(&e));

        // 17:59 EAT -> denied
        let before = Utc.with_ymd_and_hms(2024, 3, 5, 14, 59, 0).unwrap();
        assert_eq!(
            decide(f, before, 3),
            Admission::Deny(DenyReason::OutsideEventWindow)
        );

        // 18:00 EAT -> allowed
        let at_start = Utc.with_ymd_and_hms(2024, 3, 5, 15, 0, 0).unwrap();
        assert_eq!(decide(f, at_start, 3), Admission::Allow);

        // 20:00 EAT -> still allowed
        let at_end = Utc.with_ymd_and_hms(2024, 3, 5, 17, 0, 0).unwrap();
        assert_eq!(decide(f, at_end, 3), Admission::Allow);

        // 20:01 EAT -> denied
        let past_end = Utc.with_ymd_and_hms(2024, 3, 5, 17, 1, 0).unwrap();
        assert_eq!(
            decide(f, past_end, 3),
            Admission::Deny(DenyReason::OutsideEventWindow)
        );
    }

    #[test]
    fn test_manager_bypasses_window_only() {
        let m = member(true);
        let e = event(true, false);
        let mut f = facts(Some(&m), Some(&e));
        f.actor_is_manager = true;
        f.actor_is_volunteer = false;

        // Outside the window: allowed for managers.
        assert_eq!(decide(f, after_event(), 3), Admission::Allow);

        // But a duplicate still denies, manager or not.
        f.already_checked_in = true;
        assert_eq!(
            decide(f, after_event(), 3),
            Admission::Deny(DenyReason::AlreadyCheckedIn)
        );
    }

    #[test]
    fn test_duplicate_denied_inside_window() {
        let m = member(true);
        let e = event(true, false);
        let mut f = facts(Some(&m), Some(&e));
        f.already_checked_in = true;
        assert_eq!(
            decide(f, during_event(), 3),
            Admission::Deny(DenyReason::AlreadyCheckedIn)
        );
    }

    #[test]
    fn test_guest_requires_active_and_flag() {
        assert_eq!(
            decide_guest(None),
            Admission::Deny(DenyReason::EventNotFound)
        );

        let closed = event(false, true);
        assert_eq!(
            decide_guest(Some(&closed)),
            Admission::Deny(DenyReason::CheckInClosed)
        );

        let no_guests = event(true, false);
        assert_eq!(
            decide_guest(Some(&no_guests)),
            Admission::Deny(DenyReason::NotAuthorized)
        );

        let open = event(true, true);
        assert_eq!(decide_guest(Some(&open)), Admission::Allow);
    }

    #[test]
    fn test_deny_messages_are_human_readable() {
        assert_eq!(DenyReason::AlreadyCheckedIn.message(), "Already checked in");
        assert_eq!(
            DenyReason::OutsideEventWindow.message(),
            "Not within the event time window"
        );
    }
}
