//! In-memory implementation of the repository traits.
//!
//! Backs the test suites and any caller that needs store semantics without
//! a database. Behavior mirrors [`super::PgStore`], including the
//! capacity-checked registration insert and first-match-wins email lookup.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use guild_core::{EventId, KeywordId, MemberId, RegistrationId};

use crate::error::DbError;
use crate::models::{
    Event, Keyword, Member, MemberContact, NewEvent, NewKeyword, NewMember, NewRegistration,
    NewSponsor, Registration, Sponsor,
};
use crate::store::{EventStore, KeywordStore, MemberStore, RegistrationStore, SponsorStore};

#[derive(Debug, Default)]
struct Inner {
    members: BTreeMap<i64, Member>,
    events: BTreeMap<i64, Event>,
    registrations: BTreeMap<i64, Registration>,
    sponsors: BTreeMap<i64, Sponsor>,
    keywords: BTreeMap<i64, Keyword>,
    event_speakers: Vec<(i64, i64)>,
    event_keywords: Vec<(i64, i64)>,
    next_member_id: i64,
    next_event_id: i64,
    next_registration_id: i64,
    next_sponsor_id: i64,
    next_keyword_id: i64,
}

impl Inner {
    fn assign(next: &mut i64, explicit: Option<i64>) -> i64 {
        match explicit {
            Some(id) => {
                *next = (*next).max(id + 1);
                id
            }
            None => {
                let id = *next;
                *next += 1;
                id
            }
        }
    }
}

/// In-memory store with interior mutability.
#[derive(Debug)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_member_id: 1,
                next_event_id: 1,
                next_registration_id: 1,
                next_sponsor_id: 1,
                next_keyword_id: 1,
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemberStore for MemStore {
    async fn find_member(&self, id: MemberId) -> Result<Option<Member>, DbError> {
        Ok(self.lock().members.get(&id.as_i64()).cloned())
    }

    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>, DbError> {
        // BTreeMap iteration is ID-ordered, so the lowest ID wins.
        Ok(self
            .lock()
            .members
            .values()
            .find(|m| !m.deleted && m.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_member_by_name_and_company(
        &self,
        first_name: &str,
        last_name: &str,
        company: &str,
    ) -> Result<Option<Member>, DbError> {
        Ok(self
            .lock()
            .members
            .values()
            .find(|m| {
                !m.deleted
                    && m.first_name == first_name
                    && m.last_name == last_name
                    && m.company.as_deref() == Some(company)
            })
            .cloned())
    }

    async fn insert_member(&self, new: NewMember) -> Result<Member, DbError> {
        let mut inner = self.lock();
        let id = Inner::assign(&mut inner.next_member_id, new.id);
        let member = Member {
            id,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            company: new.company,
            street: new.street,
            zip_code: new.zip_code,
            city: new.city,
            membership_begin: new.membership_begin,
            membership_end: new.membership_end,
            is_admin: new.is_admin,
            is_active: new.is_active,
            deleted: new.deleted,
            created_at: Utc::now(),
        };
        inner.members.insert(id, member.clone());
        Ok(member)
    }

    async fn overwrite_member_contact(
        &self,
        id: MemberId,
        contact: &MemberContact,
    ) -> Result<Member, DbError> {
        let mut inner = self.lock();
        let member = inner
            .members
            .get_mut(&id.as_i64())
            .ok_or_else(|| DbError::NotFound(format!("Member {id}")))?;
        member.first_name = contact.first_name.clone();
        member.last_name = contact.last_name.clone();
        member.company = contact.company.clone();
        member.street = contact.street.clone();
        member.zip_code = contact.zip_code.clone();
        member.city = contact.city.clone();
        member.membership_begin = contact.membership_begin;
        member.membership_end = contact.membership_end;
        Ok(member.clone())
    }

    async fn mark_member_deleted(&self, id: MemberId) -> Result<(), DbError> {
        let mut inner = self.lock();
        let member = inner
            .members
            .get_mut(&id.as_i64())
            .ok_or_else(|| DbError::NotFound(format!("Member {id}")))?;
        member.deleted = true;
        member.is_active = false;
        Ok(())
    }

    async fn count_members(&self) -> Result<i64, DbError> {
        Ok(self.lock().members.len() as i64)
    }

    async fn count_members_with_membership(&self) -> Result<i64, DbError> {
        Ok(self
            .lock()
            .members
            .values()
            .filter(|m| m.membership_begin.is_some())
            .count() as i64)
    }
}

#[async_trait]
impl EventStore for MemStore {
    async fn find_event(&self, id: EventId) -> Result<Option<Event>, DbError> {
        Ok(self.lock().events.get(&id.as_i64()).cloned())
    }

    async fn find_event_by_webinar_url(&self, url: &str) -> Result<Option<Event>, DbError> {
        Ok(self
            .lock()
            .events
            .values()
            .find(|e| e.webinar_url.as_deref() == Some(url))
            .cloned())
    }

    async fn insert_event(&self, new: NewEvent) -> Result<Event, DbError> {
        let mut inner = self.lock();
        let id = Inner::assign(&mut inner.next_event_id, new.id);
        let event = Event {
            id,
            title: new.title,
            subtitle: new.subtitle,
            starts_at: new.starts_at,
            duration_minutes: new.duration_minutes,
            location: new.location,
            visible: new.visible,
            capacity: new.capacity,
            description: new.description,
            agenda: new.agenda,
            language: new.language,
            level: new.level,
            webinar_url: new.webinar_url,
            organizer_id: new.organizer_id,
            created_at: Utc::now(),
        };
        inner.events.insert(id, event.clone());
        Ok(event)
    }

    async fn list_events(&self) -> Result<Vec<Event>, DbError> {
        Ok(self.lock().events.values().cloned().collect())
    }

    async fn set_event_visible(&self, id: EventId, visible: bool) -> Result<(), DbError> {
        let mut inner = self.lock();
        let event = inner
            .events
            .get_mut(&id.as_i64())
            .ok_or_else(|| DbError::NotFound(format!("Event {id}")))?;
        event.visible = visible;
        Ok(())
    }

    async fn add_event_speaker(&self, event: EventId, member: MemberId) -> Result<(), DbError> {
        let mut inner = self.lock();
        let pair = (event.as_i64(), member.as_i64());
        if !inner.event_speakers.contains(&pair) {
            inner.event_speakers.push(pair);
        }
        Ok(())
    }

    async fn count_event_speakers(&self, event: EventId) -> Result<i64, DbError> {
        Ok(self
            .lock()
            .event_speakers
            .iter()
            .filter(|(e, _)| *e == event.as_i64())
            .count() as i64)
    }

    async fn count_events(&self) -> Result<i64, DbError> {
        Ok(self.lock().events.len() as i64)
    }
}

#[async_trait]
impl RegistrationStore for MemStore {
    async fn find_registration(
        &self,
        event: EventId,
        member: MemberId,
    ) -> Result<Option<Registration>, DbError> {
        Ok(self
            .lock()
            .registrations
            .values()
            .find(|r| r.event_id == event.as_i64() && r.member_id == member.as_i64())
            .cloned())
    }

    async fn find_registration_by_token(
        &self,
        token: &str,
    ) -> Result<Option<Registration>, DbError> {
        Ok(self
            .lock()
            .registrations
            .values()
            .find(|r| r.token == token)
            .cloned())
    }

    async fn insert_registration_within(
        &self,
        new: NewRegistration,
        capacity: i32,
    ) -> Result<Option<Registration>, DbError> {
        let mut inner = self.lock();
        if capacity > 0 {
            let current = inner
                .registrations
                .values()
                .filter(|r| r.event_id == new.event_id)
                .count() as i64;
            if current >= i64::from(capacity) {
                return Ok(None);
            }
        }
        let id = Inner::assign(&mut inner.next_registration_id, None);
        let registration = Registration {
            id,
            event_id: new.event_id,
            member_id: new.member_id,
            registered_at: new.registered_at,
            source: new.source,
            no_show: new.no_show,
            token: new.token,
        };
        inner.registrations.insert(id, registration.clone());
        Ok(Some(registration))
    }

    async fn delete_registration(&self, id: RegistrationId) -> Result<bool, DbError> {
        Ok(self.lock().registrations.remove(&id.as_i64()).is_some())
    }

    async fn set_no_show(&self, id: RegistrationId, no_show: bool) -> Result<(), DbError> {
        let mut inner = self.lock();
        let registration = inner
            .registrations
            .get_mut(&id.as_i64())
            .ok_or_else(|| DbError::NotFound(format!("Registration {id}")))?;
        registration.no_show = no_show;
        Ok(())
    }

    async fn count_registrations_for_event(&self, event: EventId) -> Result<i64, DbError> {
        Ok(self
            .lock()
            .registrations
            .values()
            .filter(|r| r.event_id == event.as_i64())
            .count() as i64)
    }

    async fn count_event_registrations_by_source(
        &self,
        event: EventId,
        source: &str,
    ) -> Result<i64, DbError> {
        Ok(self
            .lock()
            .registrations
            .values()
            .filter(|r| r.event_id == event.as_i64() && r.source == source)
            .count() as i64)
    }

    async fn count_registrations(&self) -> Result<i64, DbError> {
        Ok(self.lock().registrations.len() as i64)
    }
}

#[async_trait]
impl SponsorStore for MemStore {
    async fn insert_sponsor(&self, new: NewSponsor) -> Result<Sponsor, DbError> {
        let mut inner = self.lock();
        let id = Inner::assign(&mut inner.next_sponsor_id, new.id);
        let sponsor = Sponsor {
            id,
            name: new.name,
            website: new.website,
            level: new.level,
            active: new.active,
        };
        inner.sponsors.insert(id, sponsor.clone());
        Ok(sponsor)
    }

    async fn count_sponsors(&self) -> Result<i64, DbError> {
        Ok(self.lock().sponsors.len() as i64)
    }
}

#[async_trait]
impl KeywordStore for MemStore {
    async fn insert_keyword(&self, new: NewKeyword) -> Result<Keyword, DbError> {
        let mut inner = self.lock();
        let id = Inner::assign(&mut inner.next_keyword_id, new.id);
        let keyword = Keyword {
            id,
            label: new.label,
        };
        inner.keywords.insert(id, keyword.clone());
        Ok(keyword)
    }

    async fn link_event_keyword(&self, event: EventId, keyword: KeywordId) -> Result<(), DbError> {
        let mut inner = self.lock();
        let pair = (event.as_i64(), keyword.as_i64());
        if !inner.event_keywords.contains(&pair) {
            inner.event_keywords.push(pair);
        }
        Ok(())
    }

    async fn count_keywords(&self) -> Result<i64, DbError> {
        Ok(self.lock().keywords.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_member_assigns_sequential_ids() {
        let store = MemStore::new();
        let a = store.insert_member(NewMember::default()).await.unwrap();
        let b = store.insert_member(NewMember::default()).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_explicit_id_bumps_sequence() {
        let store = MemStore::new();
        let legacy = store
            .insert_member(NewMember {
                id: Some(500),
                ..NewMember::default()
            })
            .await
            .unwrap();
        assert_eq!(legacy.id, 500);
        let next = store.insert_member(NewMember::default()).await.unwrap();
        assert_eq!(next.id, 501);
    }

    #[tokio::test]
    async fn test_email_lookup_skips_deleted_and_prefers_lowest_id() {
        let store = MemStore::new();
        let first = store
            .insert_member(NewMember {
                email: "a@x.com".to_string(),
                ..NewMember::default()
            })
            .await
            .unwrap();
        store
            .insert_member(NewMember {
                email: "a@x.com".to_string(),
                ..NewMember::default()
            })
            .await
            .unwrap();
        let found = store.find_member_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);

        store.mark_member_deleted(first.member_id()).await.unwrap();
        let found = store.find_member_by_email("a@x.com").await.unwrap().unwrap();
        assert_ne!(found.id, first.id);
    }

    #[tokio::test]
    async fn test_email_lookup_ignores_case() {
        let store = MemStore::new();
        let member = store
            .insert_member(NewMember {
                email: "Ada.Lovelace@X.com".to_string(),
                ..NewMember::default()
            })
            .await
            .unwrap();
        let found = store
            .find_member_by_email("ada.lovelace@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, member.id);
    }

    #[tokio::test]
    async fn test_capacity_checked_insert() {
        let store = MemStore::new();
        let event = store.insert_event(NewEvent::default()).await.unwrap();
        let new = |member_id: i64| NewRegistration {
            event_id: event.id,
            member_id,
            registered_at: Utc::now(),
            source: "Web".to_string(),
            no_show: false,
            token: format!("tok{member_id}"),
        };
        assert!(store
            .insert_registration_within(new(1), 2)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .insert_registration_within(new(2), 2)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .insert_registration_within(new(3), 2)
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            store
                .count_registrations_for_event(event.event_id())
                .await
                .unwrap(),
            2
        );
    }
}
