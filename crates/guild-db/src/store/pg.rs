//! PostgreSQL implementation of the repository traits.
//!
//! Queries are runtime-checked `query_as` strings. Inserts accept an
//! optional explicit ID (legacy imports dictate IDs) and keep the backing
//! sequence ahead of explicitly inserted values so later database-assigned
//! IDs do not collide.

use async_trait::async_trait;
use sqlx::PgPool;

use guild_core::{EventId, KeywordId, MemberId, RegistrationId};

use crate::error::DbError;
use crate::models::{
    Event, Keyword, Member, MemberContact, NewEvent, NewKeyword, NewMember, NewRegistration,
    NewSponsor, Registration, Sponsor,
};
use crate::store::{EventStore, KeywordStore, MemberStore, RegistrationStore, SponsorStore};

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Keep a sequence ahead of an explicitly inserted ID.
    async fn bump_sequence(&self, sequence: &str, id: i64) -> Result<(), DbError> {
        let sql = format!("SELECT setval('{sequence}', GREATEST((SELECT last_value FROM {sequence}), $1))");
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl MemberStore for PgStore {
    async fn find_member(&self, id: MemberId) -> Result<Option<Member>, DbError> {
        Ok(sqlx::query_as("SELECT * FROM members WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>, DbError> {
        // First match wins among duplicate emails, lowest ID first. Case
        // folded on both sides: imports lowercase their emails while admin
        // entry keeps the original casing.
        Ok(sqlx::query_as(
            "SELECT * FROM members WHERE LOWER(email) = LOWER($1) AND NOT deleted ORDER BY id LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_member_by_name_and_company(
        &self,
        first_name: &str,
        last_name: &str,
        company: &str,
    ) -> Result<Option<Member>, DbError> {
        Ok(sqlx::query_as(
            r#"
            SELECT * FROM members
            WHERE first_name = $1 AND last_name = $2 AND company = $3 AND NOT deleted
            ORDER BY id LIMIT 1
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(company)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_member(&self, new: NewMember) -> Result<Member, DbError> {
        let member: Member = sqlx::query_as(
            r#"
            INSERT INTO members (
                id, email, first_name, last_name, company, street, zip_code, city,
                membership_begin, membership_end, is_admin, is_active, deleted
            )
            VALUES (
                COALESCE($1, nextval('members_id_seq')),
                $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13
            )
            RETURNING *
            "#,
        )
        .bind(new.id)
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.company)
        .bind(&new.street)
        .bind(&new.zip_code)
        .bind(&new.city)
        .bind(new.membership_begin)
        .bind(new.membership_end)
        .bind(new.is_admin)
        .bind(new.is_active)
        .bind(new.deleted)
        .fetch_one(&self.pool)
        .await?;

        if new.id.is_some() {
            self.bump_sequence("members_id_seq", member.id).await?;
        }
        Ok(member)
    }

    async fn overwrite_member_contact(
        &self,
        id: MemberId,
        contact: &MemberContact,
    ) -> Result<Member, DbError> {
        sqlx::query_as(
            r#"
            UPDATE members SET
                first_name = $2, last_name = $3, company = $4, street = $5,
                zip_code = $6, city = $7, membership_begin = $8, membership_end = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_i64())
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.company)
        .bind(&contact.street)
        .bind(&contact.zip_code)
        .bind(&contact.city)
        .bind(contact.membership_begin)
        .bind(contact.membership_end)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("Member {id}")))
    }

    async fn mark_member_deleted(&self, id: MemberId) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE members SET deleted = true, is_active = false WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Member {id}")));
        }
        Ok(())
    }

    async fn count_members(&self) -> Result<i64, DbError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn count_members_with_membership(&self) -> Result<i64, DbError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM members WHERE membership_begin IS NOT NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn find_event(&self, id: EventId) -> Result<Option<Event>, DbError> {
        Ok(sqlx::query_as("SELECT * FROM events WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_event_by_webinar_url(&self, url: &str) -> Result<Option<Event>, DbError> {
        Ok(sqlx::query_as("SELECT * FROM events WHERE webinar_url = $1")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_event(&self, new: NewEvent) -> Result<Event, DbError> {
        let event: Event = sqlx::query_as(
            r#"
            INSERT INTO events (
                id, title, subtitle, starts_at, duration_minutes, location, visible,
                capacity, description, agenda, language, level, webinar_url, organizer_id
            )
            VALUES (
                COALESCE($1, nextval('events_id_seq')),
                $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14
            )
            RETURNING *
            "#,
        )
        .bind(new.id)
        .bind(&new.title)
        .bind(&new.subtitle)
        .bind(new.starts_at)
        .bind(new.duration_minutes)
        .bind(&new.location)
        .bind(new.visible)
        .bind(new.capacity)
        .bind(&new.description)
        .bind(&new.agenda)
        .bind(&new.language)
        .bind(&new.level)
        .bind(&new.webinar_url)
        .bind(new.organizer_id)
        .fetch_one(&self.pool)
        .await?;

        if new.id.is_some() {
            self.bump_sequence("events_id_seq", event.id).await?;
        }
        Ok(event)
    }

    async fn list_events(&self) -> Result<Vec<Event>, DbError> {
        Ok(sqlx::query_as("SELECT * FROM events ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_event_visible(&self, id: EventId, visible: bool) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE events SET visible = $2 WHERE id = $1")
            .bind(id.as_i64())
            .bind(visible)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Event {id}")));
        }
        Ok(())
    }

    async fn add_event_speaker(&self, event: EventId, member: MemberId) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO event_speakers (event_id, member_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(event.as_i64())
        .bind(member.as_i64())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_event_speakers(&self, event: EventId) -> Result<i64, DbError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM event_speakers WHERE event_id = $1")
                .bind(event.as_i64())
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }

    async fn count_events(&self) -> Result<i64, DbError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}

#[async_trait]
impl RegistrationStore for PgStore {
    async fn find_registration(
        &self,
        event: EventId,
        member: MemberId,
    ) -> Result<Option<Registration>, DbError> {
        Ok(
            sqlx::query_as("SELECT * FROM registrations WHERE event_id = $1 AND member_id = $2")
                .bind(event.as_i64())
                .bind(member.as_i64())
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_registration_by_token(
        &self,
        token: &str,
    ) -> Result<Option<Registration>, DbError> {
        Ok(sqlx::query_as("SELECT * FROM registrations WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_registration_within(
        &self,
        new: NewRegistration,
        capacity: i32,
    ) -> Result<Option<Registration>, DbError> {
        // Count and insert in one statement, so the ledger carries no
        // separate check-then-insert step. Under read committed two
        // concurrent statements can still both observe count < $7; the
        // capacity limit holds for sequential calls only.
        Ok(sqlx::query_as(
            r#"
            INSERT INTO registrations (event_id, member_id, registered_at, source, no_show, token)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE $7 = 0
               OR (SELECT COUNT(*) FROM registrations WHERE event_id = $1) < $7
            RETURNING *
            "#,
        )
        .bind(new.event_id)
        .bind(new.member_id)
        .bind(new.registered_at)
        .bind(&new.source)
        .bind(new.no_show)
        .bind(&new.token)
        .bind(capacity)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_registration(&self, id: RegistrationId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_no_show(&self, id: RegistrationId, no_show: bool) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE registrations SET no_show = $2 WHERE id = $1")
            .bind(id.as_i64())
            .bind(no_show)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Registration {id}")));
        }
        Ok(())
    }

    async fn count_registrations_for_event(&self, event: EventId) -> Result<i64, DbError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
                .bind(event.as_i64())
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }

    async fn count_event_registrations_by_source(
        &self,
        event: EventId,
        source: &str,
    ) -> Result<i64, DbError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND source = $2",
        )
        .bind(event.as_i64())
        .bind(source)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }

    async fn count_registrations(&self) -> Result<i64, DbError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM registrations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}

#[async_trait]
impl SponsorStore for PgStore {
    async fn insert_sponsor(&self, new: NewSponsor) -> Result<Sponsor, DbError> {
        let sponsor: Sponsor = sqlx::query_as(
            r#"
            INSERT INTO sponsors (id, name, website, level, active)
            VALUES (COALESCE($1, nextval('sponsors_id_seq')), $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.id)
        .bind(&new.name)
        .bind(&new.website)
        .bind(&new.level)
        .bind(new.active)
        .fetch_one(&self.pool)
        .await?;

        if new.id.is_some() {
            self.bump_sequence("sponsors_id_seq", sponsor.id).await?;
        }
        Ok(sponsor)
    }

    async fn count_sponsors(&self) -> Result<i64, DbError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sponsors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}

#[async_trait]
impl KeywordStore for PgStore {
    async fn insert_keyword(&self, new: NewKeyword) -> Result<Keyword, DbError> {
        let keyword: Keyword = sqlx::query_as(
            r#"
            INSERT INTO keywords (id, label)
            VALUES (COALESCE($1, nextval('keywords_id_seq')), $2)
            RETURNING *
            "#,
        )
        .bind(new.id)
        .bind(&new.label)
        .fetch_one(&self.pool)
        .await?;

        if new.id.is_some() {
            self.bump_sequence("keywords_id_seq", keyword.id).await?;
        }
        Ok(keyword)
    }

    async fn link_event_keyword(&self, event: EventId, keyword: KeywordId) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO event_keywords (event_id, keyword_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(event.as_i64())
        .bind(keyword.as_i64())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_keywords(&self) -> Result<i64, DbError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM keywords")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}
