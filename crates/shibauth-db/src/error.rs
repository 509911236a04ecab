//! Database-specific error types and conversions.

use shibauth_core::error::ShibauthError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// A statement was rejected by a UNIQUE index or an existing record id.
    #[error("Conflicting {entity}: {reason}")]
    Conflict { entity: String, reason: String },

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl DbError {
    /// Classify a statement error reported by `Response::check`. Duplicate
    /// rejections become `Conflict`, anything else stays a SurrealDB error.
    pub(crate) fn rejected(entity: &str, err: surrealdb::Error) -> Self {
        let reason = err.to_string();
        if is_duplicate(&reason) {
            DbError::Conflict {
                entity: entity.to_string(),
                reason,
            }
        } else {
            DbError::Surreal(err)
        }
    }
}

fn is_duplicate(message: &str) -> bool {
    message.contains("already contains") || message.contains("already exists")
}

impl From<DbError> for ShibauthError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ShibauthError::NotFound { entity, id },
            DbError::Conflict { entity, .. } => ShibauthError::AlreadyExists { entity },
            other => ShibauthError::Database(other.to_string()),
        }
    }
}
