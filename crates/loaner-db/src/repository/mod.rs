//! SurrealDB repository implementations.

mod organization;
mod session;
mod test_user;
mod user;

pub use organization::SurrealOrganizationRepository;
pub use session::SurrealSessionRepository;
pub use test_user::SurrealTestUserRepository;
pub use user::SurrealUserRepository;

use uuid::Uuid;

use crate::error::DbError;

/// Parse a UUID column, naming the column in the error.
fn parse_uuid(column: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::InvalidRow(format!("invalid {column} UUID: {e}")))
}
