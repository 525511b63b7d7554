//! Loaner Core — Shared domain types, repository traits, and errors.
//!
//! Every other crate in the workspace builds on these definitions: the
//! database crate implements the repository traits, the auth and lease
//! crates consume them, and the server maps [`error::LoanerError`] onto
//! HTTP responses.

pub mod error;
pub mod models;
pub mod repository;
