//! Authentication service: signup, login, session resolution, and logout.

use chrono::{DateTime, Duration, Utc};
use loaner_core::error::{LoanerError, LoanerResult};
use loaner_core::models::session::{CreateSession, Principal};
use loaner_core::models::user::{CreateUser, User, UserSummary};
use loaner_core::repository::{OrganizationRepository, SessionRepository, UserRepository};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Input for the signup flow.
#[derive(Debug)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub organization_id: Uuid,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// A freshly issued session.
#[derive(Debug)]
pub struct IssuedSession {
    /// Raw opaque token (return to client, not stored).
    pub token: String,
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub user: UserSummary,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U, S, O>
where
    U: UserRepository,
    S: SessionRepository,
    O: OrganizationRepository,
{
    user_repo: U,
    session_repo: S,
    org_repo: O,
    config: AuthConfig,
}

impl<U, S, O> AuthService<U, S, O>
where
    U: UserRepository,
    S: SessionRepository,
    O: OrganizationRepository,
{
    pub fn new(user_repo: U, session_repo: S, org_repo: O, config: AuthConfig) -> Self {
        Self {
            user_repo,
            session_repo,
            org_repo,
            config,
        }
    }

    /// Register a new account holder in an existing organization and
    /// issue a session.
    ///
    /// Fails with `AlreadyExists` for a registered email and `NotFound`
    /// for an unknown organization; no session is issued in either case.
    pub async fn signup(&self, input: SignupInput) -> LoanerResult<IssuedSession> {
        if input.password.chars().count() < self.config.min_password_length {
            return Err(AuthError::PasswordTooShort {
                min: self.config.min_password_length,
            }
            .into());
        }

        match self.user_repo.get_by_email(&input.email).await {
            Ok(_) => {
                return Err(LoanerError::AlreadyExists {
                    entity: "user".into(),
                });
            }
            Err(LoanerError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let organization = self.org_repo.get_by_id(input.organization_id).await?;

        let user = self
            .user_repo
            .create(CreateUser {
                organization_id: organization.id,
                email: input.email,
                password: input.password,
            })
            .await?;

        info!(user_id = %user.id, organization_id = %organization.id, "Account created");

        self.create_session(&user).await
    }

    /// Authenticate an account holder by email and password and issue a
    /// session. Unknown emails and wrong passwords are indistinguishable.
    pub async fn login(&self, input: LoginInput) -> LoanerResult<IssuedSession> {
        let user = self
            .user_repo
            .get_by_email(&input.email)
            .await
            .map_err(|e| match e {
                LoanerError::NotFound { .. } => AuthError::InvalidCredentials.into(),
                other => other,
            })?;

        password::require_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;

        self.create_session(&user).await
    }

    /// Issue an opaque session token bound to the user and their
    /// organization, valid for the configured lifetime.
    pub async fn create_session(&self, user: &User) -> LoanerResult<IssuedSession> {
        let raw = token::generate_session_token();
        let expires_at = Utc::now() + self.session_lifetime();

        let session = self
            .session_repo
            .create(CreateSession {
                user_id: user.id,
                organization_id: user.organization_id,
                token_hash: token::hash_session_token(&raw),
                expires_at,
            })
            .await?;

        info!(
            session_id = %session.id,
            user_id = %user.id,
            organization_id = %user.organization_id,
            "Session issued"
        );

        Ok(IssuedSession {
            token: raw,
            session_id: session.id,
            expires_at: session.expires_at,
            user: UserSummary::from(user),
        })
    }

    /// Resolve a raw session token to the caller it was issued to.
    ///
    /// Returns `None` for unknown or expired tokens, for sessions whose
    /// user no longer exists, and when the store cannot be reached; this
    /// never fails hard. Expired and dangling sessions are deleted.
    pub async fn resolve(&self, raw_token: &str) -> Option<Principal> {
        let token_hash = token::hash_session_token(raw_token);

        let session = match self.session_repo.get_by_token_hash(&token_hash).await {
            Ok(session) => session,
            Err(LoanerError::NotFound { .. }) => {
                debug!("Unknown session token");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Session lookup failed; treating caller as anonymous");
                return None;
            }
        };

        if session.expires_at <= Utc::now() {
            self.discard(session.id, "expired").await;
            return None;
        }

        let user = match self.user_repo.get_by_id(session.user_id).await {
            Ok(user) => user,
            Err(LoanerError::NotFound { .. }) => {
                self.discard(session.id, "user no longer exists").await;
                return None;
            }
            Err(e) => {
                warn!(error = %e, "User lookup failed; treating caller as anonymous");
                return None;
            }
        };

        if user.organization_id != session.organization_id {
            self.discard(session.id, "organization mismatch").await;
            return None;
        }

        Some(Principal {
            session_id: session.id,
            user_id: user.id,
            organization_id: user.organization_id,
            email: user.email,
        })
    }

    /// Destroy the session behind a raw token. Idempotent: unknown tokens
    /// are not an error.
    pub async fn logout(&self, raw_token: &str) -> LoanerResult<()> {
        let token_hash = token::hash_session_token(raw_token);
        match self.session_repo.get_by_token_hash(&token_hash).await {
            Ok(session) => {
                self.session_repo.invalidate(session.id).await?;
                info!(session_id = %session.id, "Session destroyed");
                Ok(())
            }
            Err(LoanerError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Delete every expired session.
    pub async fn purge_expired_sessions(&self) -> LoanerResult<u64> {
        let removed = self.session_repo.purge_expired(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "Purged expired sessions");
        }
        Ok(removed)
    }

    async fn discard(&self, session_id: Uuid, reason: &str) {
        debug!(%session_id, reason, "Discarding session");
        if let Err(e) = self.session_repo.invalidate(session_id).await {
            warn!(%session_id, error = %e, "Failed to delete stale session");
        }
    }

    fn session_lifetime(&self) -> Duration {
        i64::try_from(self.config.session_lifetime_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| Duration::days(7))
    }
}
