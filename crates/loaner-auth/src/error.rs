//! Authentication error types.

use loaner_core::error::LoanerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for LoanerError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => LoanerError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::PasswordTooShort { .. } => LoanerError::Validation {
                message: err.to_string(),
            },
            AuthError::Crypto(msg) => LoanerError::Internal(msg),
        }
    }
}
