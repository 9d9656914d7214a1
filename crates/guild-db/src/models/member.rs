//! Member entity model.
//!
//! Represents a person in the community database: attendee, speaker,
//! organizer or admin.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use guild_core::MemberId;

/// A person record in the community database.
///
/// Members are soft-deleted (`deleted` flag) so that registration history
/// stays intact. Email uniqueness among active members is a soft invariant:
/// legacy import paths tolerate duplicates, and lookups resolve them
/// first-match-wins.
#[derive(Debug, Clone, FromRow)]
pub struct Member {
    /// Unique identifier. May be externally assigned by a legacy system.
    pub id: i64,

    /// Email address. May be blank for hand-entered legacy records.
    pub email: String,

    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// Company, used by the identity resolver's name+company match.
    pub company: Option<String>,

    /// Street address.
    pub street: Option<String>,

    /// Postal code, stored normalized (no trailing ".0" artifacts).
    pub zip_code: Option<String>,

    /// City.
    pub city: Option<String>,

    /// Start of the membership period.
    pub membership_begin: Option<NaiveDate>,

    /// End of the membership period.
    pub membership_end: Option<NaiveDate>,

    /// Whether this member may use the admin UI.
    pub is_admin: bool,

    /// Whether the account is active.
    pub is_active: bool,

    /// Soft-delete flag. Deleted members keep their registrations.
    pub deleted: bool,

    /// When the member was created.
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Get the member ID as a typed `MemberId`.
    #[must_use]
    pub fn member_id(&self) -> MemberId {
        MemberId::from_i64(self.id)
    }

    /// Full display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether the member has a usable email address.
    #[must_use]
    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }
}

/// Payload for inserting a member.
///
/// `id` is `None` for database-assigned IDs and `Some` when a legacy system
/// dictates the ID (legacy import, organizer placeholder members).
#[derive(Debug, Clone, Default)]
pub struct NewMember {
    pub id: Option<i64>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub street: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub membership_begin: Option<NaiveDate>,
    pub membership_end: Option<NaiveDate>,
    pub is_admin: bool,
    pub is_active: bool,
    pub deleted: bool,
}

/// Contact and membership fields overwritten wholesale by the membership
/// spreadsheet import. Spreadsheet data is authoritative; this is a full
/// overwrite, not a merge.
#[derive(Debug, Clone, Default)]
pub struct MemberContact {
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub street: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub membership_begin: Option<NaiveDate>,
    pub membership_end: Option<NaiveDate>,
}
