//! Error types for the import reconcilers.

use thiserror::Error;

use guild_core::GuildError;
use guild_db::DbError;
use guild_ledger::LedgerError;

/// Import reconciliation errors.
///
/// Unrecoverable row failures abort the run; there is no per-row
/// skip-and-continue beyond the recovery paths built into each reconciler.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The workbook does not contain the requested sheet.
    #[error("Missing sheet: {0}")]
    MissingSheet(String),

    /// A required header was not found in a sheet.
    #[error("Missing header '{header}' in sheet '{sheet}'")]
    MissingHeader {
        /// Name of the sheet that was searched.
        sheet: String,
        /// The header (or header fragment) that was required.
        header: String,
    },

    /// The report is structurally invalid.
    #[error("Invalid report: {0}")]
    InvalidReport(String),

    /// The webinar report references an event that does not exist.
    ///
    /// Aborts the whole run; there is no recovery path.
    #[error("No event found for webinar URL '{webinar_url}'")]
    EventNotFound {
        /// The correlation URL taken from the report's summary sheet.
        webinar_url: String,
    },

    /// A date or time value could not be parsed in any accepted format.
    #[error("Unparsable date/time value: '{0}'")]
    DateParse(String),

    /// The organizer mapping file could not be loaded or parsed.
    #[error("Organizer map error: {0}")]
    Config(String),

    /// A ledger operation failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// A store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<ImportError> for GuildError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::EventNotFound { webinar_url } => GuildError::NotFound {
                resource: "Event".to_string(),
                id: Some(webinar_url),
            },
            ImportError::Ledger(e) => e.into(),
            ImportError::Database(e) => e.into(),
            other => GuildError::Validation {
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
        let err: GuildError = ImportError::EventNotFound {
            webinar_url: "https://bigmarker.com/guild/x".to_string(),
        }
        .into();
        assert!(matches!(err, GuildError::NotFound { .. }));

        let err: GuildError = ImportError::DateParse("yesterday".to_string()).into();
        assert!(matches!(err, GuildError::Validation { .. }));

        let err: GuildError = ImportError::Database(DbError::NotFound("Event 1".to_string())).into();
        assert!(matches!(err, GuildError::NotFound { .. }));
    }
}
