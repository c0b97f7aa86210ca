//! Side-effectful application services over the repositories.

pub mod academic;
pub mod checkin;
pub mod email;
pub mod registration;
pub mod sync;
pub mod tag_lifecycle;

#[allow(unused_imports)] // Re-exports for downstream use
pub use academic::AcademicService;
#[allow(unused_imports)] // Re-exports for downstream use
pub use checkin::CheckInService;
#[allow(unused_imports)] // Re-exports for downstream use
pub use email::EmailService;
#[allow(unused_imports)] // Re-exports for downstream use
pub use registration::OnboardingService;
#[allow(unused_imports)] // Re-exports for downstream use
pub use sync::SyncService;
#[allow(unused_imports)] // Re-exports for downstream use
pub use tag_lifecycle::TagLifecycleService;
