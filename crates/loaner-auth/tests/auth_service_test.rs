//! Integration tests for the authentication service.

use loaner_auth::config::AuthConfig;
use loaner_auth::service::{AuthService, LoginInput, SignupInput};
use loaner_auth::token;
use loaner_core::error::LoanerError;
use loaner_core::models::organization::CreateOrganization;
use loaner_core::models::user::CreateUser;
use loaner_core::repository::{OrganizationRepository, SessionRepository, UserRepository};
use loaner_db::repository::{
    SurrealOrganizationRepository, SurrealSessionRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Service = AuthService<
    SurrealUserRepository<Db>,
    SurrealSessionRepository<Db>,
    SurrealOrganizationRepository<Db>,
>;

/// Spin up in-memory DB, run migrations, create an organization with one
/// account holder (alice@x.com / pw1).
async fn setup_with(config: AuthConfig) -> (Service, Surreal<Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    loaner_db::run_migrations(&db).await.unwrap();

    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let org = org_repo
        .create(CreateOrganization {
            name: "Acme".into(),
        })
        .await
        .unwrap();

    let user_repo = match config.pepper.clone() {
        Some(p) => SurrealUserRepository::with_pepper(db.clone(), p),
        None => SurrealUserRepository::new(db.clone()),
    };
    user_repo
        .create(CreateUser {
            organization_id: org.id,
            email: "alice@x.com".into(),
            password: "pw1".into(),
        })
        .await
        .unwrap();

    let service = AuthService::new(
        user_repo,
        SurrealSessionRepository::new(db.clone()),
        org_repo,
        config,
    );

    (service, db, org.id)
}

async fn setup() -> (Service, Surreal<Db>, Uuid) {
    setup_with(AuthConfig::default()).await
}

fn login(email: &str, password: &str) -> LoginInput {
    LoginInput {
        email: email.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn login_issues_resolvable_session() {
    let (service, _db, org_id) = setup().await;

    let issued = service.login(login("alice@x.com", "pw1")).await.unwrap();
    assert_eq!(issued.user.email, "alice@x.com");
    assert_eq!(issued.user.organization_id, org_id);
    assert!(issued.expires_at > chrono::Utc::now());

    let principal = service.resolve(&issued.token).await.unwrap();
    assert_eq!(principal.user_id, issued.user.id);
    assert_eq!(principal.organization_id, org_id);
    assert_eq!(principal.email, "alice@x.com");
    assert_eq!(principal.session_id, issued.session_id);
}

#[tokio::test]
async fn session_stores_only_token_digest() {
    let (service, db, _) = setup().await;
    let issued = service.login(login("alice@x.com", "pw1")).await.unwrap();

    let sessions = SurrealSessionRepository::new(db);
    let stored = sessions
        .get_by_token_hash(&token::hash_session_token(&issued.token))
        .await
        .unwrap();
    assert_ne!(stored.token_hash, issued.token);
    assert_eq!(stored.id, issued.session_id);
}

#[tokio::test]
async fn login_wrong_password_fails() {
    let (service, _, _) = setup().await;

    let err = service
        .login(login("alice@x.com", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, LoanerError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn login_unknown_email_is_indistinguishable() {
    let (service, _, _) = setup().await;

    let unknown = service
        .login(login("nobody@x.com", "pw1"))
        .await
        .unwrap_err();
    let wrong = service
        .login(login("alice@x.com", "nope"))
        .await
        .unwrap_err();
    assert_eq!(unknown.to_string(), wrong.to_string());
}

#[tokio::test]
async fn login_with_pepper() {
    let config = AuthConfig {
        pepper: Some("server-side-pepper".into()),
        ..AuthConfig::default()
    };
    let (service, _, _) = setup_with(config).await;

    assert!(service.login(login("alice@x.com", "pw1")).await.is_ok());
}

#[tokio::test]
async fn signup_creates_user_and_session() {
    let (service, _, org_id) = setup().await;

    let issued = service
        .signup(SignupInput {
            email: "bob@x.com".into(),
            password: "pw2".into(),
            organization_id: org_id,
        })
        .await
        .unwrap();
    assert_eq!(issued.user.email, "bob@x.com");

    let principal = service.resolve(&issued.token).await.unwrap();
    assert_eq!(principal.organization_id, org_id);

    // The new account can log in on its own.
    assert!(service.login(login("bob@x.com", "pw2")).await.is_ok());
}

#[tokio::test]
async fn signup_duplicate_email_rejected() {
    let (service, _, org_id) = setup().await;

    let err = service
        .signup(SignupInput {
            email: "alice@x.com".into(),
            password: "another".into(),
            organization_id: org_id,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LoanerError::AlreadyExists { .. }));
}

#[tokio::test]
async fn signup_duplicate_email_checked_before_organization() {
    let (service, _, _) = setup().await;

    let err = service
        .signup(SignupInput {
            email: "alice@x.com".into(),
            password: "pw".into(),
            organization_id: Uuid::new_v4(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LoanerError::AlreadyExists { .. }));
}

#[tokio::test]
async fn signup_unknown_organization_rejected() {
    let (service, _, _) = setup().await;

    let err = service
        .signup(SignupInput {
            email: "carol@x.com".into(),
            password: "pw".into(),
            organization_id: Uuid::new_v4(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LoanerError::NotFound { .. }));

    // No account was created.
    assert!(service.login(login("carol@x.com", "pw")).await.is_err());
}

#[tokio::test]
async fn signup_enforces_min_password_length() {
    let config = AuthConfig {
        min_password_length: 8,
        ..AuthConfig::default()
    };
    let (service, _, org_id) = setup_with(config).await;

    let err = service
        .signup(SignupInput {
            email: "dave@x.com".into(),
            password: "short".into(),
            organization_id: org_id,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LoanerError::Validation { .. }));
}

#[tokio::test]
async fn resolve_unknown_token_is_anonymous() {
    let (service, _, _) = setup().await;
    assert!(service.resolve("not-a-real-token").await.is_none());
    assert!(service.resolve("").await.is_none());
}

#[tokio::test]
async fn expired_session_is_anonymous_and_removed() {
    let config = AuthConfig {
        session_lifetime_secs: 0,
        ..AuthConfig::default()
    };
    let (service, db, _) = setup_with(config).await;

    let issued = service.login(login("alice@x.com", "pw1")).await.unwrap();
    assert!(service.resolve(&issued.token).await.is_none());

    let sessions = SurrealSessionRepository::new(db);
    let err = sessions
        .get_by_token_hash(&token::hash_session_token(&issued.token))
        .await
        .unwrap_err();
    assert!(matches!(err, LoanerError::NotFound { .. }));
}

#[tokio::test]
async fn logout_destroys_session() {
    let (service, _, _) = setup().await;
    let issued = service.login(login("alice@x.com", "pw1")).await.unwrap();

    service.logout(&issued.token).await.unwrap();
    assert!(service.resolve(&issued.token).await.is_none());

    // Idempotent.
    service.logout(&issued.token).await.unwrap();
    service.logout("never-issued").await.unwrap();
}

#[tokio::test]
async fn logout_leaves_other_sessions_alone() {
    let (service, _, _) = setup().await;
    let first = service.login(login("alice@x.com", "pw1")).await.unwrap();
    let second = service.login(login("alice@x.com", "pw1")).await.unwrap();
    assert_ne!(first.token, second.token);

    service.logout(&first.token).await.unwrap();
    assert!(service.resolve(&first.token).await.is_none());
    assert!(service.resolve(&second.token).await.is_some());
}

#[tokio::test]
async fn purge_removes_only_expired_sessions() {
    let (live_service, db, org_id) = setup().await;
    let live = live_service
        .login(login("alice@x.com", "pw1"))
        .await
        .unwrap();

    let expiring = AuthService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealSessionRepository::new(db.clone()),
        SurrealOrganizationRepository::new(db.clone()),
        AuthConfig {
            session_lifetime_secs: 0,
            ..AuthConfig::default()
        },
    );
    expiring.login(login("alice@x.com", "pw1")).await.unwrap();
    expiring.login(login("alice@x.com", "pw1")).await.unwrap();

    let removed = live_service.purge_expired_sessions().await.unwrap();
    assert_eq!(removed, 2);

    let principal = live_service.resolve(&live.token).await.unwrap();
    assert_eq!(principal.organization_id, org_id);
}
