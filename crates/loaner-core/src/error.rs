//! Error types for the Loaner system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanerError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Test user {id} is already checked out")]
    AlreadyCheckedOut { id: String },

    #[error("Test user {id} is checked out by another user")]
    NotLeaseHolder { id: String },

    #[error("Test user {id} is not checked out")]
    NotCheckedOut { id: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LoanerError {
    /// Shorthand for a [`LoanerError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`LoanerError::NotFound`] error.
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::AlreadyExists { .. } => "already_exists",
            Self::AuthenticationFailed { .. } => "invalid_credentials",
            Self::AuthorizationDenied { .. } => "forbidden",
            Self::Validation { .. } => "invalid_request",
            Self::AlreadyCheckedOut { .. } => "already_checked_out",
            Self::NotLeaseHolder { .. } => "not_lease_holder",
            Self::NotCheckedOut { .. } => "not_checked_out",
            Self::Database(_) | Self::Internal(_) => "internal_error",
        }
    }

    /// Whether this error is an expected lease conflict rather than a
    /// fault. Clients react to these by refreshing state.
    pub fn is_lease_conflict(&self) -> bool {
        matches!(
            self,
            Self::AlreadyCheckedOut { .. } | Self::NotLeaseHolder { .. } | Self::NotCheckedOut { .. }
        )
    }
}

pub type LoanerResult<T> = Result<T, LoanerError>;
