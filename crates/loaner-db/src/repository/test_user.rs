//! SurrealDB implementation of [`TestUserRepository`].
//!
//! Lease transitions are single conditional `UPDATE ... WHERE` statements:
//! the guard on `is_checked_out` / `checked_out_by` is evaluated and the new
//! lease written inside one statement transaction, so two racing checkouts
//! can never both observe `AVAILABLE`. If the engine aborts a statement on
//! a write conflict it is re-run, and the re-evaluated guard then sees the
//! winner's committed lease. A statement that conflicts on every attempt
//! counts as rejected by its guard.

use chrono::{DateTime, Utc};
use loaner_core::error::LoanerResult;
use loaner_core::models::test_user::{CreateTestUser, TestUser};
use loaner_core::repository::TestUserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, warn};
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

/// How many times a guarded transition is attempted when the engine
/// reports a transaction conflict.
const LEASE_TRANSITION_ATTEMPTS: usize = 10;

const CHECK_OUT: &str = "\
UPDATE type::record('test_user', $id) SET \
    is_checked_out = true, \
    checked_out_by = $user_id, \
    checked_out_at = time::now(), \
    updated_at = time::now() \
WHERE organization_id = $organization_id AND is_checked_out = false";

const CHECK_IN: &str = "\
UPDATE type::record('test_user', $id) SET \
    is_checked_out = false, \
    checked_out_by = NONE, \
    checked_out_at = NONE, \
    updated_at = time::now() \
WHERE organization_id = $organization_id \
    AND is_checked_out = true \
    AND checked_out_by = $user_id";

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TestUserRow {
    organization_id: String,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    is_checked_out: bool,
    checked_out_by: Option<String>,
    checked_out_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TestUserRow {
    fn into_test_user(self, id: Uuid) -> Result<TestUser, DbError> {
        let checked_out_by = self
            .checked_out_by
            .as_deref()
            .map(|raw| parse_uuid("holder", raw))
            .transpose()?;

        if self.is_checked_out != checked_out_by.is_some() {
            return Err(DbError::InvalidRow(format!(
                "test_user {id} has inconsistent lease fields"
            )));
        }

        Ok(TestUser {
            id,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
            is_checked_out: self.is_checked_out,
            checked_out_by,
            checked_out_at: self.checked_out_at,
            created_at: self.created_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TestUserRowWithId {
    record_id: String,
    organization_id: String,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    is_checked_out: bool,
    checked_out_by: Option<String>,
    checked_out_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TestUserRowWithId {
    fn try_into_test_user(self) -> Result<TestUser, DbError> {
        let id = parse_uuid("test_user", &self.record_id)?;
        TestUserRow {
            organization_id: self.organization_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
            is_checked_out: self.is_checked_out,
            checked_out_by: self.checked_out_by,
            checked_out_at: self.checked_out_at,
            created_at: self.created_at,
        }
        .into_test_user(id)
    }
}

/// SurrealDB implementation of the TestUser repository.
#[derive(Clone)]
pub struct SurrealTestUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTestUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Run one guarded lease statement, retrying on transaction conflicts.
    ///
    /// Returns the updated record, or `None` if the guard rejected it.
    async fn guarded_transition(
        &self,
        statement: &'static str,
        organization_id: Uuid,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TestUser>, DbError> {
        retry_on_conflict(id, || {
            self.run_transition(statement, organization_id, id, user_id)
        })
        .await
    }

    async fn run_transition(
        &self,
        statement: &'static str,
        organization_id: Uuid,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TestUser>, DbError> {
        let result = self
            .db
            .query(statement)
            .bind(("id", id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TestUserRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(|row| row.into_test_user(id))
            .transpose()
    }
}

/// Run `transition` until it stops conflicting, at most
/// [`LEASE_TRANSITION_ATTEMPTS`] times.
///
/// A transition that still conflicts on the last attempt is reported as
/// rejected by its guard: some concurrent transition on the same record
/// committed, so the caller lost the race.
async fn retry_on_conflict<F, Fut>(
    id: Uuid,
    mut transition: F,
) -> Result<Option<TestUser>, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<TestUser>, DbError>>,
{
    for attempt in 1..=LEASE_TRANSITION_ATTEMPTS {
        match transition().await {
            Err(err) if err.is_transaction_conflict() => {
                debug!(test_user_id = %id, attempt, "Lease transition conflicted, retrying");
            }
            other => return other,
        }
    }

    warn!(
        test_user_id = %id,
        attempts = LEASE_TRANSITION_ATTEMPTS,
        "Lease transition kept conflicting, treating it as rejected"
    );
    Ok(None)
}

impl<C: Connection> TestUserRepository for SurrealTestUserRepository<C> {
    async fn create(&self, input: CreateTestUser) -> LoanerResult<TestUser> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('test_user', $id) SET \
                 organization_id = $organization_id, \
                 first_name = $first_name, \
                 last_name = $last_name, \
                 email = $email, \
                 password = $password, \
                 is_checked_out = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("email", input.email))
            .bind(("password", input.password))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TestUserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "test_user".into(),
            id: id_str,
        })?;

        Ok(row.into_test_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> LoanerResult<TestUser> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('test_user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TestUserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "test_user".into(),
            id: id_str,
        })?;

        Ok(row.into_test_user(id)?)
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> LoanerResult<Vec<TestUser>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM test_user \
                 WHERE organization_id = $organization_id \
                 ORDER BY created_at DESC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TestUserRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_test_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> LoanerResult<bool> {
        let result = self
            .db
            .query(
                "DELETE type::record('test_user', $id) \
                 WHERE organization_id = $organization_id \
                 RETURN BEFORE",
            )
            .bind(("id", id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TestUserRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn try_check_out(
        &self,
        organization_id: Uuid,
        id: Uuid,
        user_id: Uuid,
    ) -> LoanerResult<Option<TestUser>> {
        Ok(self
            .guarded_transition(CHECK_OUT, organization_id, id, user_id)
            .await?)
    }

    async fn try_check_in(
        &self,
        organization_id: Uuid,
        id: Uuid,
        user_id: Uuid,
    ) -> LoanerResult<Option<TestUser>> {
        Ok(self
            .guarded_transition(CHECK_IN, organization_id, id, user_id)
            .await?)
    }
}
