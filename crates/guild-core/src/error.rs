//! Standardized error types shared across the guild crates.
//!
//! # Example
//!
//! ```
//! use guild_core::{GuildError, Result};
//!
//! fn find_member(id: i64) -> Result<String> {
//!     if id <= 0 {
//!         return Err(GuildError::NotFound {
//!             resource: "Member".to_string(),
//!             id: Some(id.to_string()),
//!         });
//!     }
//!     Ok(format!("Member {id}"))
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// Standardized error type for the guild platform.
///
/// Service crates define their own richer error enums and convert into this
/// type at the outermost boundary where a uniform taxonomy is needed.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuildError {
    /// Requested resource was not found.
    #[error("{resource} not found{}", id.as_ref().map(|i| format!(": {i}")).unwrap_or_default())]
    NotFound {
        /// The type of resource that was not found (e.g., "Member", "Event").
        resource: String,
        /// Optional identifier of the resource.
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Input validation failure.
    #[error("Validation failed: {message}")]
    Validation {
        /// What was wrong with the input.
        message: String,
    },

    /// A state conflict (duplicate registration, capacity reached).
    ///
    /// Conflicts that callers are expected to branch on are reported as
    /// typed outcome values by the ledger, not as this error; this variant
    /// covers conflicts with no recovery path.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting state.
        message: String,
    },

    /// Internal failure with no more specific classification.
    #[error("Internal error: {message}")]
    Internal {
        /// Description for logs; not intended for end users.
        message: String,
    },
}

/// Result type alias using [`GuildError`].
pub type Result<T> = std::result::Result<T, GuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_with_id() {
        let err = GuildError::NotFound {
            resource: "Event".to_string(),
            id: Some("17".to_string()),
        };
        assert_eq!(err.to_string(), "Event not found: 17");
    }

    #[test]
    fn test_not_found_display_without_id() {
        let err = GuildError::NotFound {
            resource: "Member".to_string(),
            id: None,
        };
        assert_eq!(err.to_string(), "Member not found");
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let err = GuildError::Validation {
            message: "missing email".to_string(),
        };
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"type\":\"validation\""));
    }
}
