//! Session endpoints: login, signup, current session, logout.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;
use loaner_auth::{LoginInput, SignupInput};
use loaner_core::models::user::UserSummary;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::extract::{self, Payload, Valid, parse_id, required, required_verbatim};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

impl Payload for LoginRequest {
    type Input = LoginInput;

    fn into_input(self) -> Result<LoginInput> {
        Ok(LoginInput {
            email: required(self.email, "email")?,
            password: required_verbatim(self.password, "password")?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignupRequest {
    email: Option<String>,
    password: Option<String>,
    organization_id: Option<String>,
}

impl Payload for SignupRequest {
    type Input = SignupInput;

    fn into_input(self) -> Result<SignupInput> {
        let email = required(self.email, "email")?;
        let password = required_verbatim(self.password, "password")?;
        let organization_id = parse_id(&required(self.organization_id, "organizationId")?)?;
        Ok(SignupInput {
            email,
            password,
            organization_id,
        })
    }
}

/// `{"user": ...}`; `null` when there is no live session.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<UserSummary>,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Valid(input): Valid<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let session = state.auth.login(input).await?;
    let jar = extract::set_session(jar, &state, &session);
    Ok((
        jar,
        Json(SessionResponse {
            user: Some(session.user),
        }),
    ))
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Valid(input): Valid<SignupRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let session = state.auth.signup(input).await?;
    let jar = extract::set_session(jar, &state, &session);
    Ok((
        jar,
        Json(SessionResponse {
            user: Some(session.user),
        }),
    ))
}

/// GET /api/auth/session
///
/// Never fails: a missing, expired, or dangling session reports
/// `{"user": null}` and a stale cookie is cleared.
pub async fn session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SessionResponse>) {
    let Some(token) = extract::session_token(&jar, &state) else {
        return (jar, Json(SessionResponse { user: None }));
    };

    match state.auth.resolve(&token).await {
        Some(principal) => (
            jar,
            Json(SessionResponse {
                user: Some(UserSummary {
                    id: principal.user_id,
                    email: principal.email,
                    organization_id: principal.organization_id,
                }),
            }),
        ),
        None => (
            extract::clear_session(jar, &state),
            Json(SessionResponse { user: None }),
        ),
    }
}

/// POST /api/auth/logout
///
/// Idempotent; always clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    if let Some(token) = extract::session_token(&jar, &state) {
        if let Err(e) = state.auth.logout(&token).await {
            warn!(error = %e, "Failed to destroy session on logout");
        }
    }
    (
        extract::clear_session(jar, &state),
        Json(serde_json::json!({ "success": true })),
    )
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::error::ApiError;

    #[test]
    fn signup_request_requires_every_field() {
        let req: SignupRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"pw"}"#).unwrap();
        assert!(req.into_input().is_err());
    }

    #[test]
    fn signup_request_parses_organization_id() {
        let org = Uuid::new_v4();
        let req: SignupRequest = serde_json::from_str(&format!(
            r#"{{"email":" a@x.com ","password":"pw","organizationId":"{org}"}}"#
        ))
        .unwrap();
        let input = req.into_input().unwrap();
        assert_eq!(input.email, "a@x.com");
        assert_eq!(input.organization_id, org);
    }

    #[test]
    fn malformed_organization_id_is_rejected() {
        let req: SignupRequest = serde_json::from_str(
            r#"{"email":"a@x.com","password":"pw","organizationId":"not-a-uuid"}"#,
        )
        .unwrap();
        assert!(matches!(req.into_input(), Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: std::result::Result<LoginRequest, _> =
            serde_json::from_str(r#"{"email":"a@x.com","password":"pw","admin":true}"#);
        assert!(result.is_err());
    }
}
