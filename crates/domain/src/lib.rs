//! Domain layer for the Fellowship Manager backend.
//!
//! This crate contains:
//! - Domain models (Member, Tag, Event, Attendance)
//! - Pure business services (academic progression, admission control,
//!   tag naming, offline sync reconciliation)
//! - Domain error types

pub mod models;
pub mod services;
