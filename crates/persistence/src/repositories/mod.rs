//! Repository implementations over the connection pool.

pub mod attendance;
pub mod catalog;
pub mod event;
pub mod event_volunteer;
pub mod family;
pub mod member;
pub mod member_tag;
pub mod registration;
pub mod tag;
pub mod team;

pub use attendance::{AttendanceRepository, GuestAttendanceRepository};
pub use catalog::{AcademicPeriodRepository, CourseRepository, RegionRepository};
pub use event::{EventPatch, EventRepository, NewEvent};
pub use event_volunteer::EventVolunteerRepository;
pub use family::FamilyRepository;
pub use member::{MemberProfilePatch, MemberRepository, NewMember};
pub use member_tag::MemberTagRepository;
pub use registration::{NewRegistration, RegistrationRepository};
pub use tag::TagRepository;
pub use team::TeamRepository;
