//! Session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored session. Only the SHA-256 digest of the token is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// The authenticated caller of a request, as resolved from a live session.
///
/// Every lease operation takes a `Principal`; its `organization_id` is the
/// scope all record access is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
}
