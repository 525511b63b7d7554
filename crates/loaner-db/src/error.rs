//! Database-specific error types and conversions.

use loaner_core::error::LoanerError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed row: {0}")]
    InvalidRow(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate {entity}")]
    Duplicate { entity: String },
}

impl DbError {
    /// Whether the engine rejected a statement because a concurrent
    /// transaction touched the same record. Such statements can be
    /// re-run; their guard is re-evaluated against the committed state.
    pub(crate) fn is_transaction_conflict(&self) -> bool {
        let msg = self.to_string().to_ascii_lowercase();
        msg.contains("can be retried")
            || msg.contains("transaction conflict")
            || msg.contains("write conflict")
    }

    /// Whether a statement failed on a UNIQUE index.
    pub(crate) fn is_unique_violation(&self) -> bool {
        self.to_string().contains("already contains")
    }
}

impl From<DbError> for LoanerError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LoanerError::NotFound { entity, id },
            DbError::Duplicate { entity } => LoanerError::AlreadyExists { entity },
            other => LoanerError::Database(other.to_string()),
        }
    }
}
