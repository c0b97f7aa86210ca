//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod academic_period;
pub mod attendance;
pub mod course;
pub mod event;
pub mod event_volunteer;
pub mod family;
pub mod member;
pub mod member_tag;
pub mod region;
pub mod registration;
pub mod tag;
pub mod team;

pub use academic_period::AcademicPeriodEntity;
pub use attendance::{AttendanceEntity, AttendanceWithMemberEntity, GuestAttendanceEntity};
pub use course::CourseEntity;
pub use event::EventEntity;
pub use event_volunteer::EventVolunteerEntity;
pub use family::FamilyEntity;
pub use member::{MemberEntity, MemberRosterEntity};
pub use member_tag::{MemberTagEntity, MemberTagWithNameEntity};
pub use region::RegionEntity;
pub use registration::PendingRegistrationEntity;
pub use tag::TagEntity;
pub use team::TeamEntity;
