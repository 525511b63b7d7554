//! Test-user record domain model.
//!
//! A test-user record is a shared staging credential. Its lease fields
//! (`is_checked_out`, `checked_out_by`, `checked_out_at`) are only ever
//! written by the guarded checkout/checkin transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestUser {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub is_checked_out: bool,
    /// Set iff `is_checked_out` is true.
    pub checked_out_by: Option<Uuid>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// The lease state of a record, derived from its lease fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseState {
    Available,
    CheckedOut { by: Uuid, at: Option<DateTime<Utc>> },
}

impl TestUser {
    pub fn lease_state(&self) -> LeaseState {
        match (self.is_checked_out, self.checked_out_by) {
            (true, Some(by)) => LeaseState::CheckedOut {
                by,
                at: self.checked_out_at,
            },
            _ => LeaseState::Available,
        }
    }

    /// Whether `user_id` currently holds the lease on this record.
    pub fn is_held_by(&self, user_id: Uuid) -> bool {
        matches!(self.lease_state(), LeaseState::CheckedOut { by, .. } if by == user_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTestUser {
    pub organization_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TestUser {
        TestUser {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            first_name: "Alice".into(),
            last_name: "Tester".into(),
            email: "alice@x.com".into(),
            password: "pw1".into(),
            is_checked_out: false,
            checked_out_by: None,
            checked_out_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn available_record_has_no_holder() {
        let r = record();
        assert_eq!(r.lease_state(), LeaseState::Available);
        assert!(!r.is_held_by(Uuid::new_v4()));
    }

    #[test]
    fn checked_out_record_reports_holder() {
        let holder = Uuid::new_v4();
        let mut r = record();
        r.is_checked_out = true;
        r.checked_out_by = Some(holder);
        r.checked_out_at = Some(Utc::now());

        assert!(matches!(r.lease_state(), LeaseState::CheckedOut { by, .. } if by == holder));
        assert!(r.is_held_by(holder));
        assert!(!r.is_held_by(Uuid::new_v4()));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(record()).unwrap();
        assert!(json.get("firstName").is_some());
        assert!(json.get("isCheckedOut").is_some());
        assert!(json.get("checkedOutBy").is_some());
        assert!(json.get("organizationId").is_some());
    }
}
