//! Lease manager.

use std::collections::HashMap;

use loaner_core::error::{LoanerError, LoanerResult};
use loaner_core::models::session::Principal;
use loaner_core::models::test_user::{CreateTestUser, LeaseState, TestUser};
use loaner_core::models::user::UserSummary;
use loaner_core::repository::{TestUserRepository, UserRepository};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A record together with the public identity of its current holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldRecord {
    pub record: TestUser,
    /// `None` when the record is available (or the holder can no longer
    /// be found).
    pub holder: Option<UserSummary>,
}

/// Exclusive, non-expiring leases on test-user records.
///
/// Generic over repository implementations so that the lease layer has no
/// dependency on the database crate.
pub struct LeaseManager<T, U>
where
    T: TestUserRepository,
    U: UserRepository,
{
    records: T,
    users: U,
}

impl<T, U> LeaseManager<T, U>
where
    T: TestUserRepository,
    U: UserRepository,
{
    pub fn new(records: T, users: U) -> Self {
        Self { records, users }
    }

    /// Create a new, available record in the caller's organization.
    pub async fn register(&self, caller: &Principal, input: CreateTestUser) -> LoanerResult<TestUser> {
        require_same_organization(caller, input.organization_id)?;

        let record = self.records.create(input).await?;
        info!(
            test_user_id = %record.id,
            organization_id = %record.organization_id,
            created_by = %caller.user_id,
            "Test user registered"
        );
        Ok(record)
    }

    /// Records of `organization_id`, newest first, each with its holder.
    pub async fn list(
        &self,
        caller: &Principal,
        organization_id: Uuid,
    ) -> LoanerResult<Vec<HeldRecord>> {
        require_same_organization(caller, organization_id)?;

        let records = self.records.list_by_organization(organization_id).await?;
        let holders = self.holders(&records).await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let holder = record
                    .checked_out_by
                    .and_then(|by| holders.get(&by).cloned());
                HeldRecord { record, holder }
            })
            .collect())
    }

    /// Fetch one record of the caller's organization.
    pub async fn get(&self, caller: &Principal, id: Uuid) -> LoanerResult<TestUser> {
        let record = self.records.get_by_id(id).await?;
        require_same_organization(caller, record.organization_id)?;
        Ok(record)
    }

    /// `AVAILABLE -> CHECKED_OUT(caller, now)`.
    ///
    /// Fails with `AlreadyCheckedOut` if anyone holds the record, the
    /// caller included.
    pub async fn checkout(&self, caller: &Principal, id: Uuid) -> LoanerResult<TestUser> {
        match self
            .records
            .try_check_out(caller.organization_id, id, caller.user_id)
            .await?
        {
            Some(record) => {
                info!(test_user_id = %id, holder = %caller.user_id, "Test user checked out");
                Ok(record)
            }
            None => Err(self.explain_rejected_checkout(caller, id).await),
        }
    }

    /// `CHECKED_OUT(caller, _) -> AVAILABLE`.
    ///
    /// Only the current holder may release a lease; anyone else gets
    /// `NotLeaseHolder`. Releasing an available record is `NotCheckedOut`.
    pub async fn checkin(&self, caller: &Principal, id: Uuid) -> LoanerResult<TestUser> {
        match self
            .records
            .try_check_in(caller.organization_id, id, caller.user_id)
            .await?
        {
            Some(record) => {
                info!(test_user_id = %id, holder = %caller.user_id, "Test user checked in");
                Ok(record)
            }
            None => Err(self.explain_rejected_checkin(caller, id).await),
        }
    }

    /// Remove a record of the caller's organization regardless of its
    /// lease state, discarding any lease.
    pub async fn delete(&self, caller: &Principal, id: Uuid) -> LoanerResult<()> {
        if self.records.delete(caller.organization_id, id).await? {
            info!(test_user_id = %id, deleted_by = %caller.user_id, "Test user deleted");
            return Ok(());
        }

        // Nothing was removed: either the id is unknown or it belongs to
        // another organization.
        self.get(caller, id).await?;
        Err(LoanerError::not_found("test_user", id))
    }

    /// Public identities of the holders of `records`, keyed by user id.
    pub async fn holders(&self, records: &[TestUser]) -> LoanerResult<HashMap<Uuid, UserSummary>> {
        let mut holders = HashMap::new();
        for holder_id in records.iter().filter_map(|r| r.checked_out_by) {
            if holders.contains_key(&holder_id) {
                continue;
            }
            match self.users.get_by_id(holder_id).await {
                Ok(user) => {
                    holders.insert(holder_id, UserSummary::from(&user));
                }
                Err(LoanerError::NotFound { .. }) => {
                    warn!(user_id = %holder_id, "Lease holder no longer exists");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(holders)
    }

    async fn explain_rejected_checkout(&self, caller: &Principal, id: Uuid) -> LoanerError {
        let record = match self.get(caller, id).await {
            Ok(record) => record,
            Err(e) => return e,
        };

        debug!(test_user_id = %id, state = ?record.lease_state(), "Checkout rejected");
        // The guard saw the record held. If it has been released since, the
        // caller still lost that race.
        LoanerError::AlreadyCheckedOut { id: id.to_string() }
    }

    async fn explain_rejected_checkin(&self, caller: &Principal, id: Uuid) -> LoanerError {
        let record = match self.get(caller, id).await {
            Ok(record) => record,
            Err(e) => return e,
        };

        debug!(test_user_id = %id, state = ?record.lease_state(), "Checkin rejected");
        match record.lease_state() {
            LeaseState::CheckedOut { by, .. } if by != caller.user_id => {
                LoanerError::NotLeaseHolder { id: id.to_string() }
            }
            // Available, or held by the caller because their own checkout
            // landed after the guard ran.
            _ => LoanerError::NotCheckedOut { id: id.to_string() },
        }
    }
}

fn require_same_organization(caller: &Principal, organization_id: Uuid) -> LoanerResult<()> {
    if caller.organization_id == organization_id {
        Ok(())
    } else {
        warn!(
            user_id = %caller.user_id,
            caller_organization_id = %caller.organization_id,
            target_organization_id = %organization_id,
            "Cross-organization access denied"
        );
        Err(LoanerError::AuthorizationDenied {
            reason: "resource belongs to another organization".into(),
        })
    }
}
