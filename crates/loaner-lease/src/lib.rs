//! Loaner Lease — the exclusive checkout/checkin state machine over
//! test-user records.
//!
//! Every operation takes the caller's [`Principal`](loaner_core::models::session::Principal)
//! and is scoped to the caller's organization. The atomicity of the two
//! transitions is delegated to the store's guarded updates; this crate
//! decides what a rejected guard means for the caller.

pub mod manager;

pub use manager::{HeldRecord, LeaseManager};
