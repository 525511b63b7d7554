//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Test-user operations take an
//! `organization_id` wherever the record is addressed on behalf of a
//! caller, so that the store itself enforces organization scoping.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::LoanerResult;
use crate::models::{
    organization::{CreateOrganization, Organization},
    session::{CreateSession, Session},
    test_user::{CreateTestUser, TestUser},
    user::{CreateUser, User},
};

// ---------------------------------------------------------------------------
// Organizations and account holders (global scope)
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = LoanerResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LoanerResult<Organization>> + Send;
    /// All organizations, newest first.
    fn list(&self) -> impl Future<Output = LoanerResult<Vec<Organization>>> + Send;
}

pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the email is already registered.
    fn create(&self, input: CreateUser) -> impl Future<Output = LoanerResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LoanerResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = LoanerResult<User>> + Send;
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = LoanerResult<Session>> + Send;
    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = LoanerResult<Session>> + Send;
    /// Remove a session. Removing an unknown session is not an error.
    fn invalidate(&self, id: Uuid) -> impl Future<Output = LoanerResult<()>> + Send;
    /// Delete every session that expired before `now`, returning how many
    /// were removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> impl Future<Output = LoanerResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Test-user records (organization scope)
// ---------------------------------------------------------------------------

pub trait TestUserRepository: Send + Sync {
    fn create(&self, input: CreateTestUser)
    -> impl Future<Output = LoanerResult<TestUser>> + Send;

    /// Unscoped lookup, used to tell "missing" apart from "belongs to
    /// another organization". Callers must not hand the result to a
    /// caller from a different organization.
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LoanerResult<TestUser>> + Send;

    /// Records of one organization, newest first.
    fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = LoanerResult<Vec<TestUser>>> + Send;

    /// Delete a record of the given organization regardless of its lease
    /// state. Returns `false` if no such record exists in that
    /// organization.
    fn delete(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = LoanerResult<bool>> + Send;

    /// Atomically transition an available record of the given organization
    /// to checked out by `user_id`.
    ///
    /// Returns `None` when the guard does not hold (record missing, in
    /// another organization, or already checked out); the record is left
    /// untouched in that case.
    fn try_check_out(
        &self,
        organization_id: Uuid,
        id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = LoanerResult<Option<TestUser>>> + Send;

    /// Atomically release a record of the given organization held by
    /// `user_id`.
    ///
    /// Returns `None` when the guard does not hold (record missing, in
    /// another organization, available, or held by someone else).
    fn try_check_in(
        &self,
        organization_id: Uuid,
        id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = LoanerResult<Option<TestUser>>> + Send;
}
