//! Domain models for the Fellowship Manager.

pub mod academic_period;
pub mod attendance;
pub mod course;
pub mod event;
pub mod family;
pub mod member;
pub mod member_tag;
pub mod registration;
pub mod sync;
pub mod tag;
pub mod team;
pub mod volunteer;

pub use academic_period::AcademicPeriod;
pub use attendance::{Attendance, CheckInMethod, GuestAttendance};
pub use course::Course;
pub use event::{Event, EventStatus, EventType};
pub use family::Family;
pub use member::{Gender, Member, MemberRole, MemberSummary};
pub use member_tag::{Actor, MemberTag};
pub use registration::{PendingRegistration, RegistrationStatus};
pub use sync::{SyncBatchResponse, SyncRecord};
pub use tag::{system_tags, Tag, TagType};
pub use team::Team;
pub use volunteer::EventVolunteer;
