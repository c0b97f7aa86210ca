//! Domain services for the Fellowship Manager.
//!
//! Services contain business logic that operates on domain models; none
//! of them touch the database or the system clock directly.

pub mod academic;
pub mod admission;
pub mod event_status;
pub mod offline_sync;
pub mod tag_naming;
pub mod tag_policy;

pub use academic::{
    assess, elapsed_periods, progress, standing, AcademicAssessment, AcademicProfile,
    AcademicStanding, DEFAULT_SEMESTERS_PER_YEAR,
};

pub use admission::{decide, decide_guest, Admission, AdmissionFacts, DenyReason};

pub use event_status::{
    derive_status, event_window_utc, in_event_window, local_to_utc, DEFAULT_TZ_OFFSET_HOURS,
};

pub use offline_sync::{
    FlushOutcome, InMemoryQueueStore, QueueStore, QueueStoreError, QueuedCheckIn, SyncReconciler,
    SyncTransport, SyncTransportError,
};

pub use tag_naming::{generated_tag_name, normalize_name, GeneratedRole};

pub use tag_policy::{
    reconcile_academic_tags, AcademicTagPlan, AcademicTagState, Deactivation,
};
