//! Derived event status and check-in window arithmetic.
//!
//! Event dates and times are scheduled in the organization's fixed local
//! timezone; the offset is configuration, not a literal, and "now" is
//! always passed in.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::models::event::{Event, EventStatus};

/// Default organizational timezone offset in hours east of UTC (EAT).
pub const DEFAULT_TZ_OFFSET_HOURS: i32 = 3;

/// Converts a local event date+time into a UTC instant under the given
/// offset.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz_offset_hours: i32) -> DateTime<Utc> {
    let offset = FixedOffset::east_opt(tz_offset_hours * 3600)
        .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        // Fixed offsets have no DST gaps; the fold is unreachable but the
        // API forces a choice.
        .unwrap_or_else(|| offset.from_utc_datetime(&date.and_time(time)))
        .with_timezone(&Utc)
}

/// The `[start, end]` window of an event as UTC instants.
pub fn event_window_utc(event: &Event, tz_offset_hours: i32) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        local_to_utc(event.event_date, event.start_time, tz_offset_hours),
        local_to_utc(event.event_date, event.end_time, tz_offset_hours),
    )
}

/// True when `now` falls within the event's inclusive time window.
pub fn in_event_window(event: &Event, now: DateTime<Utc>, tz_offset_hours: i32) -> bool {
    let (start, end) = event_window_utc(event, tz_offset_hours);
    now >= start && now <= end
}

/// Derives the event's position relative to `now`.
///
/// Purely a function of the schedule; independent of `is_active`, which is
/// a manual check-in gate.
pub fn derive_status(event: &Event, now: DateTime<Utc>, tz_offset_hours: i32) -> EventStatus {
    let (start, end) = event_window_utc(event, tz_offset_hours);
    if now < start {
        EventStatus::Upcoming
    } else if now <= end {
        EventStatus::Ongoing
    } else {
        EventStatus::Past
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventType;
    use uuid::Uuid;

    fn evening_event() -> Event {
        Event {
            id: Uuid::new_v4(),
            name: "Friday Fellowship".into(),
            event_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
            event_type: EventType::Fellowship,
            venue: None,
            is_active: true,
            allow_guest_checkin: false,
            is_recurring: false,
            recurrence_rule: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// 18:00 EAT == 15:00 UTC.
    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, h, m, 0).unwrap()
    }

    #[test]
    fn test_local_to_utc_applies_offset() {
        let instant = local_to_utc(
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            3,
        );
        assert_eq!(instant, utc(15, 0));
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let event = evening_event();

        // 17:59 local -> before window
        assert!(!in_event_window(&event, utc(14, 59), 3));
        // 18:00 local -> inside
        assert!(in_event_window(&event, utc(15, 0), 3));
        // 20:00 local -> still inside
        assert!(in_event_window(&event, utc(17, 0), 3));
        // 20:01 local -> after window
        assert!(!in_event_window(&event, utc(17, 1), 3));
    }

    #[test]
    fn test_derive_status_progression() {
        let event = evening_event();
        assert_eq!(derive_status(&event, utc(10, 0), 3), EventStatus::Upcoming);
        assert_eq!(derive_status(&event, utc(16, 0), 3), EventStatus::Ongoing);
        assert_eq!(derive_status(&event, utc(17, 0), 3), EventStatus::Ongoing);
        assert_eq!(derive_status(&event, utc(18, 30), 3), EventStatus::Past);
    }

    #[test]
    fn test_status_independent_of_active_flag() {
        let mut event = evening_event();
        event.is_active = false;
        assert_eq!(derive_status(&event, utc(16, 0), 3), EventStatus::Ongoing);
    }

    #[test]
    fn test_zero_offset_behaves_as_utc() {
        let event = evening_event();
        assert!(in_event_window(&event, utc(18, 0), 0));
        assert!(!in_event_window(&event, utc(15, 0), 0));
    }
}
