//! Error types for the guild-db crate.
//!
//! Provides a unified error type that wraps `SQLx` errors with additional context.

use thiserror::Error;

use guild_core::GuildError;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to establish or acquire a database connection.
    ///
    /// This typically indicates network issues, invalid credentials,
    /// or the database server being unavailable.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A database migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),

    /// A database query failed to execute.
    ///
    /// This can indicate SQL syntax errors, constraint violations,
    /// or issues with the query parameters.
    #[error("Query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl DbError {
    /// Check if this error indicates a connection problem.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, DbError::ConnectionFailed(_))
    }

    /// Check if this error indicates a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_))
    }
}

impl From<DbError> for GuildError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(resource) => GuildError::NotFound {
                resource,
                id: None,
            },
            other => GuildError::Internal {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_to_platform_error() {
        let err: GuildError = DbError::NotFound("Member 9".to_string()).into();
        assert!(matches!(err, GuildError::NotFound { .. }));

        let err: GuildError = DbError::QueryFailed(sqlx::Error::PoolClosed).into();
        assert!(matches!(err, GuildError::Internal { .. }));
    }

    #[test]
    fn test_not_found_display() {
        let err = DbError::NotFound("Member 9".to_string());
        assert_eq!(err.to_string(), "Not found: Member 9");
        assert!(err.is_not_found());
        assert!(!err.is_connection_error());
    }
}
