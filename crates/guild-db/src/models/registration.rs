//! Registration entity model.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use guild_core::{EventId, MemberId, RegistrationId};

/// Length of the deregistration token (case-sensitive alphanumerics).
pub const DEREGISTRATION_TOKEN_LEN: usize = 32;

/// A (member, event) attendance record.
///
/// At most one registration exists per (event, member) pair, enforced by
/// lookup-before-insert in the ledger.
#[derive(Debug, Clone, FromRow)]
pub struct Registration {
    /// Unique identifier.
    pub id: i64,

    /// The event this registration belongs to.
    pub event_id: i64,

    /// The registered member.
    pub member_id: i64,

    /// When the registration was made.
    pub registered_at: DateTime<Utc>,

    /// Free-text source label: "Web", "Admin", "BigMarker", "Legacy".
    pub source: String,

    /// Whether the registrant failed to attend.
    pub no_show: bool,

    /// Secret deregistration token, unique per registration.
    pub token: String,
}

impl Registration {
    /// Get the registration ID as a typed `RegistrationId`.
    #[must_use]
    pub fn registration_id(&self) -> RegistrationId {
        RegistrationId::from_i64(self.id)
    }

    /// Get the event ID as a typed `EventId`.
    #[must_use]
    pub fn event(&self) -> EventId {
        EventId::from_i64(self.event_id)
    }

    /// Get the member ID as a typed `MemberId`.
    #[must_use]
    pub fn member(&self) -> MemberId {
        MemberId::from_i64(self.member_id)
    }
}

/// Payload for inserting a registration.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub event_id: i64,
    pub member_id: i64,
    pub registered_at: DateTime<Utc>,
    pub source: String,
    pub no_show: bool,
    pub token: String,
}
