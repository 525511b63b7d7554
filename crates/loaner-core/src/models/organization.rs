//! Organization domain model.
//!
//! Organizations are the top-level entity in Loaner's multi-tenancy model.
//! Every account holder and every test-user record belongs to exactly one
//! organization, and all record access is scoped by it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A team sharing a pool of staging test accounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
}
