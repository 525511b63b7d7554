//! Loaner Auth — Session authority: opaque session tokens, password
//! verification, and the signup/login/resolve/logout flows.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{AuthService, IssuedSession, LoginInput, SignupInput};
