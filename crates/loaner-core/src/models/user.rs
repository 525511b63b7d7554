//! User (account holder) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// Globally unique login identifier.
    pub email: String,
    /// Argon2id PHC-format hash.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub organization_id: Uuid,
    pub email: String,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
}

/// The public face of an account holder: what sessions report and what
/// lease listings embed as the holder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub organization_id: Uuid,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            organization_id: user.organization_id,
        }
    }
}
