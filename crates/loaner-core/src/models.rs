//! Domain models for Loaner.
//!
//! These are the core types shared across all crates.

pub mod organization;
pub mod session;
pub mod test_user;
pub mod user;
