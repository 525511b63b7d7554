//! Test-user endpoints. Every route requires a session and is scoped to
//! the caller's organization by the lease manager.

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use loaner_core::models::session::Principal;
use loaner_core::models::test_user::{CreateTestUser, TestUser};
use loaner_core::models::user::UserSummary;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::extract::{Payload, RequireSession, Valid, parse_id, required, required_verbatim};
use crate::state::AppState;

/// The holder as shown to other members: identity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolderView {
    pub id: Uuid,
    pub email: String,
}

impl From<UserSummary> for HolderView {
    fn from(user: UserSummary) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// A test-user record as returned to a member of its organization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestUserView {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub is_checked_out: bool,
    pub checked_out_by: Option<HolderView>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TestUserView {
    /// Render `record` for `viewer`. With `conceal`, the password is only
    /// included for the current holder.
    pub fn new(
        record: TestUser,
        holder: Option<UserSummary>,
        viewer: &Principal,
        conceal: bool,
    ) -> Self {
        let password = if conceal && !record.is_held_by(viewer.user_id) {
            None
        } else {
            Some(record.password)
        };

        Self {
            id: record.id,
            organization_id: record.organization_id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            password,
            is_checked_out: record.is_checked_out,
            checked_out_by: holder.map(HolderView::from),
            checked_out_at: record.checked_out_at,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    org_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTestUserRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    organization_id: Option<String>,
}

impl Payload for CreateTestUserRequest {
    type Input = CreateTestUser;

    fn into_input(self) -> Result<CreateTestUser> {
        Ok(CreateTestUser {
            first_name: required(self.first_name, "firstName")?,
            last_name: required(self.last_name, "lastName")?,
            email: required(self.email, "email")?,
            password: required_verbatim(self.password, "password")?,
            organization_id: parse_id(&required(self.organization_id, "organizationId")?)?,
        })
    }
}

fn caller_summary(caller: &Principal) -> UserSummary {
    UserSummary {
        id: caller.user_id,
        email: caller.email.clone(),
        organization_id: caller.organization_id,
    }
}

/// GET /api/test-users?orgId=
pub async fn list(
    State(state): State<AppState>,
    RequireSession(caller): RequireSession,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<TestUserView>>> {
    let Query(params) = params?;
    let organization_id = params
        .org_id
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("orgId is required".into()))
        .and_then(|raw| parse_id(&raw))?;

    let records = state.leases.list(&caller, organization_id).await?;
    let conceal = state.config.conceal_credentials;
    Ok(Json(
        records
            .into_iter()
            .map(|held| TestUserView::new(held.record, held.holder, &caller, conceal))
            .collect(),
    ))
}

/// POST /api/test-users
pub async fn create(
    State(state): State<AppState>,
    RequireSession(caller): RequireSession,
    Valid(input): Valid<CreateTestUserRequest>,
) -> Result<(StatusCode, Json<TestUserView>)> {
    let record = state.leases.register(&caller, input).await?;
    let view = TestUserView::new(record, None, &caller, state.config.conceal_credentials);
    Ok((StatusCode::CREATED, Json(view)))
}

/// DELETE /api/test-users/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireSession(caller): RequireSession,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>> {
    let Path(id) = id?;
    state.leases.delete(&caller, id).await?;
    Ok(Json(json!({ "success": true })))
}

/// POST /api/test-users/{id}/checkout
pub async fn checkout(
    State(state): State<AppState>,
    RequireSession(caller): RequireSession,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<TestUserView>> {
    let Path(id) = id?;
    let record = state.leases.checkout(&caller, id).await?;
    Ok(Json(TestUserView::new(
        record,
        Some(caller_summary(&caller)),
        &caller,
        state.config.conceal_credentials,
    )))
}

/// POST /api/test-users/{id}/checkin
pub async fn checkin(
    State(state): State<AppState>,
    RequireSession(caller): RequireSession,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<TestUserView>> {
    let Path(id) = id?;
    let record = state.leases.checkin(&caller, id).await?;
    Ok(Json(TestUserView::new(
        record,
        None,
        &caller,
        state.config.conceal_credentials,
    )))
}
