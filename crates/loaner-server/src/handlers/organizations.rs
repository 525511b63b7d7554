//! Organization endpoints. Organizations are global and unauthenticated,
//! since one must exist before anyone can sign up.

use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use loaner_core::models::organization::{CreateOrganization, Organization};
use loaner_core::repository::OrganizationRepository;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::extract::{Payload, Valid, required};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrganizationRequest {
    name: Option<String>,
}

impl Payload for CreateOrganizationRequest {
    type Input = CreateOrganization;

    fn into_input(self) -> Result<CreateOrganization> {
        Ok(CreateOrganization {
            name: required(self.name, "name")?,
        })
    }
}

/// GET /api/organizations
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Organization>>> {
    Ok(Json(state.organizations.list().await?))
}

/// POST /api/organizations
pub async fn create(
    State(state): State<AppState>,
    Valid(input): Valid<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<Organization>)> {
    let organization = state.organizations.create(input).await?;
    info!(organization_id = %organization.id, "Organization created");
    Ok((StatusCode::CREATED, Json(organization)))
}

/// GET /api/organizations/{id}
pub async fn get(
    State(state): State<AppState>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Organization>> {
    let Path(id) = id?;
    Ok(Json(state.organizations.get_by_id(id).await?))
}
