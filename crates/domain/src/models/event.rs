//! Event domain model.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Kind of fellowship gathering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Fellowship,
    BibleStudy,
    Prayer,
    Outreach,
    Special,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fellowship => "FELLOWSHIP",
            Self::BibleStudy => "BIBLE_STUDY",
            Self::Prayer => "PRAYER",
            Self::Outreach => "OUTREACH",
            Self::Special => "SPECIAL",
        }
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FELLOWSHIP" => Ok(Self::Fellowship),
            "BIBLE_STUDY" => Ok(Self::BibleStudy),
            "PRAYER" => Ok(Self::Prayer),
            "OUTREACH" => Ok(Self::Outreach),
            "SPECIAL" => Ok(Self::Special),
            other => Err(format!("unknown event type: {}", other)),
        }
    }
}

/// Derived position of an event relative to "now"; computed, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Past,
}

/// A scheduled gathering members check into.
///
/// `is_active` is a manual gate on check-in, independent of the derived
/// time-window status: an event can be ONGOING with check-in disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub event_type: EventType,
    pub venue: Option<String>,
    pub is_active: bool,
    pub allow_guest_checkin: bool,
    pub is_recurring: bool,
    pub recurrence_rule: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating an event. Times arrive as "HH:MM".
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(min = 2, max = 120, message = "Event name must be 2-120 characters"))]
    pub name: String,

    pub event_date: NaiveDate,

    #[validate(custom(function = "shared::validation::validate_event_time"))]
    pub start_time: String,

    #[validate(custom(function = "shared::validation::validate_event_time"))]
    pub end_time: String,

    pub event_type: EventType,

    #[validate(length(max = 120, message = "Venue must be at most 120 characters"))]
    pub venue: Option<String>,

    #[serde(default)]
    pub allow_guest_checkin: bool,

    #[serde(default)]
    pub is_recurring: bool,

    #[validate(length(max = 120, message = "Recurrence rule must be at most 120 characters"))]
    pub recurrence_rule: Option<String>,
}

/// Request payload for updating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[validate(length(min = 2, max = 120, message = "Event name must be 2-120 characters"))]
    pub name: Option<String>,

    pub event_date: Option<NaiveDate>,

    #[validate(custom(function = "shared::validation::validate_event_time"))]
    pub start_time: Option<String>,

    #[validate(custom(function = "shared::validation::validate_event_time"))]
    pub end_time: Option<String>,

    pub event_type: Option<EventType>,

    #[validate(length(max = 120, message = "Venue must be at most 120 characters"))]
    pub venue: Option<String>,

    pub is_active: Option<bool>,
    pub allow_guest_checkin: Option<bool>,
    pub is_recurring: Option<bool>,

    #[validate(length(max = 120, message = "Recurrence rule must be at most 120 characters"))]
    pub recurrence_rule: Option<String>,
}

/// Event representation on the wire, with the derived status attached and
/// times rendered back to "HH:MM".
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub name: String,
    pub event_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub event_type: EventType,
    pub venue: Option<String>,
    pub is_active: bool,
    pub allow_guest_checkin: bool,
    pub is_recurring: bool,
    pub recurrence_rule: Option<String>,
    pub status: EventStatus,
}

impl EventResponse {
    pub fn from_event(event: Event, status: EventStatus) -> Self {
        Self {
            id: event.id,
            name: event.name,
            event_date: event.event_date,
            start_time: event.start_time.format("%H:%M").to_string(),
            end_time: event.end_time.format("%H:%M").to_string(),
            event_type: event.event_type,
            venue: event.venue,
            is_active: event.is_active,
            allow_guest_checkin: event.allow_guest_checkin,
            is_recurring: event.is_recurring,
            recurrence_rule: event.recurrence_rule,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_roundtrip() {
        for ty in [
            EventType::Fellowship,
            EventType::BibleStudy,
            EventType::Prayer,
            EventType::Outreach,
            EventType::Special,
        ] {
            assert_eq!(EventType::from_str(ty.as_str()).unwrap(), ty);
        }
        assert!(EventType::from_str("POTLUCK").is_err());
    }

    #[test]
    fn test_event_response_renders_hhmm() {
        let event = Event {
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
        };

        let response = EventResponse::from_event(event, EventStatus::Upcoming);
        assert_eq!(response.start_time, "18:00");
        assert_eq!(response.end_time, "20:00");
        assert_eq!(response.status, EventStatus::Upcoming);
    }
}
