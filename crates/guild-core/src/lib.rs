//! guild core library
//!
//! Shared types for the guild community-management platform.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`MemberId`, `EventId`, ...)
//! - [`error`] - Standardized error types ([`GuildError`])

pub mod error;
pub mod ids;

// Re-export main types for convenient access
pub use error::{GuildError, Result};
pub use ids::{EventId, KeywordId, MemberId, ParseIdError, RegistrationId};
