//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! Record keys are UUIDs; references to other records are stored as UUID
//! strings. Ownership fields (`organization_id`) are READONLY, so a record
//! can never move to another organization.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Organizations (global scope)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_created ON TABLE organization \
    COLUMNS created_at;

-- =======================================================================
-- Users / account holders (global scope, email is the login)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE user TYPE string READONLY;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_org ON TABLE user COLUMNS organization_id;

-- =======================================================================
-- Test users (organization scope, lease fields guarded)
-- =======================================================================
DEFINE TABLE test_user SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE test_user TYPE string READONLY;
DEFINE FIELD first_name ON TABLE test_user TYPE string;
DEFINE FIELD last_name ON TABLE test_user TYPE string;
DEFINE FIELD email ON TABLE test_user TYPE string;
DEFINE FIELD password ON TABLE test_user TYPE string;
DEFINE FIELD is_checked_out ON TABLE test_user TYPE bool DEFAULT false;
DEFINE FIELD checked_out_by ON TABLE test_user TYPE option<string>;
DEFINE FIELD checked_out_at ON TABLE test_user TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE test_user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE test_user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_test_user_org ON TABLE test_user \
    COLUMNS organization_id, created_at;

-- =======================================================================
-- Sessions (opaque token digests)
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD user_id ON TABLE session TYPE string;
DEFINE FIELD organization_id ON TABLE session TYPE string;
DEFINE FIELD token_hash ON TABLE session TYPE string;
DEFINE FIELD expires_at ON TABLE session TYPE datetime;
DEFINE FIELD created_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_session_token ON TABLE session \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_session_expiry ON TABLE session COLUMNS expires_at;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum. Each
/// migration and its tracking row are committed in one transaction.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    let pending = MIGRATIONS
        .iter()
        .filter(|m| m.version > current_version);

    for migration in pending {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        let statement = format!(
            "BEGIN TRANSACTION;\n{}\n\
             CREATE _migration SET version = $version, name = $name;\n\
             COMMIT TRANSACTION;",
            migration.sql
        );

        db.query(statement)
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "v{} '{}': {}",
                    migration.version, migration.name, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
