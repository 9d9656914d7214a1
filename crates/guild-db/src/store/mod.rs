//! Repository traits over the persisted-record store.
//!
//! The persistence boundary is a set of per-entity traits with typed
//! get/upsert/delete operations. [`PgStore`] is the PostgreSQL
//! implementation; [`MemStore`] is an in-memory implementation used by
//! tests and by callers that need a store without a database.

mod memory;
mod pg;

pub use memory::MemStore;
pub use pg::PgStore;

use async_trait::async_trait;

use guild_core::{EventId, KeywordId, MemberId, RegistrationId};

use crate::error::DbError;
use crate::models::{
    Event, Keyword, Member, MemberContact, NewEvent, NewKeyword, NewMember, NewRegistration,
    NewSponsor, Registration, Sponsor,
};

/// Typed access to member records.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Look up a member by ID.
    async fn find_member(&self, id: MemberId) -> Result<Option<Member>, DbError>;

    /// Look up a non-deleted member by email, case-insensitively.
    ///
    /// Email uniqueness is a soft invariant; when several members share an
    /// email the first match (lowest ID) wins.
    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>, DbError>;

    /// Look up a non-deleted member by exact first name, last name and company.
    async fn find_member_by_name_and_company(
        &self,
        first_name: &str,
        last_name: &str,
        company: &str,
    ) -> Result<Option<Member>, DbError>;

    /// Insert a member. When `new.id` is set the ID is taken verbatim
    /// (legacy import); otherwise the store assigns one.
    async fn insert_member(&self, new: NewMember) -> Result<Member, DbError>;

    /// Overwrite the contact and membership fields of an existing member.
    async fn overwrite_member_contact(
        &self,
        id: MemberId,
        contact: &MemberContact,
    ) -> Result<Member, DbError>;

    /// Soft-delete a member, preserving registration history.
    async fn mark_member_deleted(&self, id: MemberId) -> Result<(), DbError>;

    /// Total number of member rows, deleted included.
    async fn count_members(&self) -> Result<i64, DbError>;

    /// Number of members carrying a membership begin date.
    ///
    /// Run guard for the membership spreadsheet import.
    async fn count_members_with_membership(&self) -> Result<i64, DbError>;
}

/// Typed access to event records.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Look up an event by ID.
    async fn find_event(&self, id: EventId) -> Result<Option<Event>, DbError>;

    /// Look up an event by its webinar URL (correlation key for the
    /// webinar attendance report import).
    async fn find_event_by_webinar_url(&self, url: &str) -> Result<Option<Event>, DbError>;

    /// Insert an event. ID semantics as for [`MemberStore::insert_member`].
    async fn insert_event(&self, new: NewEvent) -> Result<Event, DbError>;

    /// All events, ordered by ID.
    async fn list_events(&self) -> Result<Vec<Event>, DbError>;

    /// Set the public-visibility flag.
    async fn set_event_visible(&self, id: EventId, visible: bool) -> Result<(), DbError>;

    /// Attach a speaker to an event. Idempotent.
    async fn add_event_speaker(&self, event: EventId, member: MemberId) -> Result<(), DbError>;

    /// Number of speakers attached to an event.
    async fn count_event_speakers(&self, event: EventId) -> Result<i64, DbError>;

    /// Total number of event rows.
    async fn count_events(&self) -> Result<i64, DbError>;
}

/// Typed access to registration records.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Look up the registration for an (event, member) pair.
    async fn find_registration(
        &self,
        event: EventId,
        member: MemberId,
    ) -> Result<Option<Registration>, DbError>;

    /// Look up a registration by its deregistration token.
    async fn find_registration_by_token(
        &self,
        token: &str,
    ) -> Result<Option<Registration>, DbError>;

    /// Insert a registration unless the event is already at capacity.
    ///
    /// `capacity` of 0 means unlimited. Returns `None` when the event is
    /// full. The count-and-insert is a single operation of the store, so
    /// callers carry no check-then-insert step of their own; the limit is
    /// guaranteed for sequential calls, and concurrent calls can still
    /// overshoot it.
    async fn insert_registration_within(
        &self,
        new: NewRegistration,
        capacity: i32,
    ) -> Result<Option<Registration>, DbError>;

    /// Delete a registration. Returns whether a row was deleted.
    async fn delete_registration(&self, id: RegistrationId) -> Result<bool, DbError>;

    /// Unconditionally overwrite the no-show flag.
    async fn set_no_show(&self, id: RegistrationId, no_show: bool) -> Result<(), DbError>;

    /// Number of registrations for an event.
    async fn count_registrations_for_event(&self, event: EventId) -> Result<i64, DbError>;

    /// Number of registrations for an event with a given source label.
    ///
    /// Run guard for the webinar attendance report import.
    async fn count_event_registrations_by_source(
        &self,
        event: EventId,
        source: &str,
    ) -> Result<i64, DbError>;

    /// Total number of registration rows.
    async fn count_registrations(&self) -> Result<i64, DbError>;
}

/// Typed access to sponsor records.
#[async_trait]
pub trait SponsorStore: Send + Sync {
    /// Insert a sponsor. ID semantics as for [`MemberStore::insert_member`].
    async fn insert_sponsor(&self, new: NewSponsor) -> Result<Sponsor, DbError>;

    /// Total number of sponsor rows.
    async fn count_sponsors(&self) -> Result<i64, DbError>;
}

/// Typed access to the keyword taxonomy.
#[async_trait]
pub trait KeywordStore: Send + Sync {
    /// Insert a keyword. ID semantics as for [`MemberStore::insert_member`].
    async fn insert_keyword(&self, new: NewKeyword) -> Result<Keyword, DbError>;

    /// Attach a keyword to an event. Idempotent.
    async fn link_event_keyword(&self, event: EventId, keyword: KeywordId) -> Result<(), DbError>;

    /// Total number of keyword rows.
    async fn count_keywords(&self) -> Result<i64, DbError>;
}

/// Convenience bound for callers that need the whole store surface.
pub trait Store:
    MemberStore + EventStore + RegistrationStore + SponsorStore + KeywordStore
{
}

impl<T> Store for T where
    T: MemberStore + EventStore + RegistrationStore + SponsorStore + KeywordStore
{
}
