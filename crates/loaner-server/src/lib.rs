//! Loaner Server — the HTTP access gateway.
//!
//! Resolves the session cookie, validates request bodies, delegates to the
//! session authority and the lease manager, and maps every failure onto a
//! JSON error response.

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::AppState;

use handlers::{auth, health, organizations, test_users};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/session", get(auth::session))
        .route("/auth/logout", post(auth::logout))
        .route("/organizations", get(organizations::list).post(organizations::create))
        .route("/organizations/{id}", get(organizations::get))
        .route("/test-users", get(test_users::list).post(test_users::create))
        .route("/test-users/{id}", delete(test_users::delete))
        .route("/test-users/{id}/checkout", post(test_users::checkout))
        .route("/test-users/{id}/checkin", post(test_users::checkin));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
