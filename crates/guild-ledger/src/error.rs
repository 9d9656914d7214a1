//! Error types for the registration ledger.

use thiserror::Error;

use guild_core::{EventId, GuildError, MemberId};
use guild_db::DbError;

use crate::notify::NotifyError;

/// Ledger and identity-resolution errors.
///
/// Capacity-full and duplicate-registration are not errors; they are typed
/// outcome values (`RegisterOutcome`) so the caller decides the messaging.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The referenced event does not exist.
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    /// The referenced member does not exist.
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    /// Sending a notification failed.
    #[error("Notification failed: {0}")]
    Notification(#[from] NotifyError),

    /// Underlying store failure.
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<LedgerError> for GuildError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::EventNotFound(id) => GuildError::NotFound {
                resource: "Event".to_string(),
                id: Some(id.to_string()),
            },
            LedgerError::MemberNotFound(id) => GuildError::NotFound {
                resource: "Member".to_string(),
                id: Some(id.to_string()),
            },
            LedgerError::Notification(e) => GuildError::Internal {
                message: e.to_string(),
            },
            LedgerError::Database(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_to_platform_error() {
        let err: GuildError = LedgerError::EventNotFound(EventId::from_i64(17)).into();
        assert_eq!(err.to_string(), "Event not found: 17");

        let err: GuildError = LedgerError::Database(DbError::NotFound("Member 9".to_string())).into();
        assert!(matches!(err, GuildError::NotFound { .. }));
    }
}
