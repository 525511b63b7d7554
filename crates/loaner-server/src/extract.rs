//! Request extractors: the session cookie and validated JSON bodies.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use loaner_auth::IssuedSession;
use loaner_core::models::session::Principal;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Extractor that requires a live session.
///
/// Rejects with 401 when the cookie is missing, and additionally clears
/// the cookie when it no longer resolves to a session.
#[derive(Debug, Clone)]
pub struct RequireSession(pub Principal);

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = session_token(&jar, state) else {
            return Err(ApiError::Unauthenticated.into_response());
        };

        match state.auth.resolve(&token).await {
            Some(principal) => Ok(RequireSession(principal)),
            None => Err((clear_session(jar, state), ApiError::Unauthenticated).into_response()),
        }
    }
}

/// The raw session token carried by the request, if any.
pub fn session_token(jar: &CookieJar, state: &AppState) -> Option<String> {
    jar.get(&state.config.cookie.name)
        .map(|cookie| cookie.value().to_owned())
        .filter(|token| !token.is_empty())
}

/// Add the cookie for a freshly issued session.
pub fn set_session(jar: CookieJar, state: &AppState, session: &IssuedSession) -> CookieJar {
    let max_age = time::Duration::seconds(
        i64::try_from(state.config.auth.session_lifetime_secs).unwrap_or(i64::MAX),
    );
    jar.add(
        Cookie::build((state.config.cookie.name.clone(), session.token.clone()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(state.config.cookie.secure)
            .path("/")
            .max_age(max_age),
    )
}

/// Remove the session cookie from the client.
pub fn clear_session(jar: CookieJar, state: &AppState) -> CookieJar {
    jar.remove(Cookie::build((state.config.cookie.name.clone(), "")).path("/"))
}

/// A JSON request body that converts itself into a checked domain input.
pub trait Payload: DeserializeOwned + Send {
    type Input: Send;

    fn into_input(self) -> Result<Self::Input, ApiError>;
}

/// Extractor for a JSON body of type `P`, yielding its validated input.
///
/// Malformed JSON, unknown fields, and failed checks are all rejected
/// with 400 before the handler runs.
pub struct Valid<P: Payload>(pub P::Input);

impl<S, P> FromRequest<S> for Valid<P>
where
    S: Send + Sync,
    P: Payload,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<P>::from_request(req, state).await?;
        Ok(Valid(payload.into_input()?))
    }
}

/// A required, non-blank string field, trimmed.
pub fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value.map(|v| v.trim().to_owned()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::InvalidRequest(format!("{field} is required"))),
    }
}

/// A required, non-empty string field, kept verbatim.
pub fn required_verbatim(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::InvalidRequest(format!("{field} is required"))),
    }
}

/// A UUID given as a string field or query parameter.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::InvalidRequest(format!("invalid id: {raw}")))
}
