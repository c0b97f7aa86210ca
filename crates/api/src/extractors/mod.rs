//! Request extractors.

pub mod member_auth;

pub use member_auth::ManagerAuth;
