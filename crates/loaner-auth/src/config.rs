//! Authentication configuration.

use serde::Deserialize;

/// Seven days, the lifetime of a session cookie.
pub const DEFAULT_SESSION_LIFETIME_SECS: u64 = 60 * 60 * 24 * 7;

/// Configuration for the authentication service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Session lifetime in seconds (default: 604_800 = 7 days).
    pub session_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing and
    /// verification.
    pub pepper: Option<String>,
    /// Minimum password length accepted at signup.
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_lifetime_secs: DEFAULT_SESSION_LIFETIME_SECS,
            pepper: None,
            min_password_length: 1,
        }
    }
}
