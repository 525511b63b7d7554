//! Shared application state.

use std::sync::Arc;

use loaner_auth::AuthService;
use loaner_db::repository::{
    SurrealOrganizationRepository, SurrealSessionRepository, SurrealTestUserRepository,
    SurrealUserRepository,
};
use loaner_lease::LeaseManager;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

use crate::config::ServerConfig;

pub type Organizations = SurrealOrganizationRepository<Any>;
pub type Users = SurrealUserRepository<Any>;
pub type Auth = AuthService<Users, SurrealSessionRepository<Any>, Organizations>;
pub type Leases = LeaseManager<SurrealTestUserRepository<Any>, Users>;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Auth>,
    pub leases: Arc<Leases>,
    pub organizations: Organizations,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire the services onto a connected, migrated database.
    pub fn new(db: Surreal<Any>, config: ServerConfig) -> Self {
        let users = match &config.auth.pepper {
            Some(pepper) => SurrealUserRepository::with_pepper(db.clone(), pepper.clone()),
            None => SurrealUserRepository::new(db.clone()),
        };
        let organizations = SurrealOrganizationRepository::new(db.clone());

        let auth = AuthService::new(
            users.clone(),
            SurrealSessionRepository::new(db.clone()),
            organizations.clone(),
            config.auth.clone(),
        );
        let leases = LeaseManager::new(SurrealTestUserRepository::new(db), users);

        Self {
            auth: Arc::new(auth),
            leases: Arc::new(leases),
            organizations,
            config: Arc::new(config),
        }
    }
}
