//! Database-specific error types and conversions.

use stayhaven_core::error::HavenError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for HavenError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => HavenError::NotFound { entity, id },
            other => HavenError::Database(other.to_string()),
        }
    }
}
