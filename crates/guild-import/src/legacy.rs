//! Legacy SQL database import.
//!
//! Reads the old community database over a read-only connection and
//! replays it into the canonical store in dependency order: sponsors,
//! members, organizer placeholder members, events, keywords, speakers,
//! registrations, then event-level enrichment. Each table is guarded by
//! a row-count check so a restart never duplicates data.

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, warn};

use async_trait::async_trait;
use sqlx::PgPool;

use guild_core::{EventId, MemberId};
use guild_db::models::{NewEvent, NewKeyword, NewMember, NewSponsor};
use guild_db::{DbError, Store};
use guild_ledger::{Notify, RegistrationLedger};

use crate::error::ImportError;
use crate::organizer::OrganizerMap;
use crate::summary::ImportSummary;

/// Source label written on registrations created by this importer.
pub const LEGACY_SOURCE: &str = "Legacy";

/// Sponsor row in the legacy schema.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LegacySponsor {
    pub id: i64,
    pub name: String,
    pub website: Option<String>,
    pub level: Option<String>,
    pub active: bool,
}

/// Member row in the legacy schema.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LegacyMember {
    pub id: i64,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub admin: bool,
}

/// Event row in the legacy schema. Timestamps arrive as raw text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LegacyEvent {
    pub id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub starts_at: Option<String>,
    pub duration_minutes: i32,
    pub location: Option<String>,
    pub capacity: i32,
    pub description: Option<String>,
    pub agenda: Option<String>,
    pub language: Option<String>,
    pub level: Option<String>,
    pub webinar_url: Option<String>,
    pub organizer_name: Option<String>,
}

/// Event-speaker link row in the legacy schema.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LegacySpeakerLink {
    pub event_id: i64,
    pub member_id: i64,
}

/// Keyword row in the legacy schema.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LegacyKeyword {
    pub id: i64,
    pub label: String,
}

/// Event-keyword link row in the legacy schema.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LegacyKeywordLink {
    pub event_id: i64,
    pub keyword_id: i64,
}

/// Registration row in the legacy schema. Timestamps arrive as raw text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LegacyRegistration {
    pub event_id: i64,
    pub member_id: i64,
    pub registered_at: Option<String>,
    pub no_show: bool,
}

/// Read-only access to the legacy database.
#[async_trait]
pub trait LegacyDatabase: Send + Sync {
    async fn fetch_sponsors(&self) -> Result<Vec<LegacySponsor>, DbError>;
    async fn fetch_members(&self) -> Result<Vec<LegacyMember>, DbError>;
    async fn fetch_events(&self) -> Result<Vec<LegacyEvent>, DbError>;
    async fn fetch_speaker_links(&self) -> Result<Vec<LegacySpeakerLink>, DbError>;
    async fn fetch_keywords(&self) -> Result<Vec<LegacyKeyword>, DbError>;
    async fn fetch_keyword_links(&self) -> Result<Vec<LegacyKeywordLink>, DbError>;
    async fn fetch_registrations(&self) -> Result<Vec<LegacyRegistration>, DbError>;
}

/// Legacy database over a PostgreSQL connection.
///
/// Queries are fixed text against the old schema; nothing is written.
pub struct PgLegacyDatabase {
    pool: PgPool,
}

impl PgLegacyDatabase {
    /// Wrap an existing read-only pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LegacyDatabase for PgLegacyDatabase {
    async fn fetch_sponsors(&self) -> Result<Vec<LegacySponsor>, DbError> {
        let rows = sqlx::query_as::<_, LegacySponsor>(
            "SELECT id, name, website, level, active FROM sponsor ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn fetch_members(&self) -> Result<Vec<LegacyMember>, DbError> {
        let rows = sqlx::query_as::<_, LegacyMember>(
            "SELECT id, email, first_name, last_name, company, admin \
             FROM person ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn fetch_events(&self) -> Result<Vec<LegacyEvent>, DbError> {
        let rows = sqlx::query_as::<_, LegacyEvent>(
            "SELECT id, title, subtitle, starts_at, duration_minutes, location, \
                    capacity, description, agenda, language, level, webinar_url, \
                    organizer_name \
             FROM meetup ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn fetch_speaker_links(&self) -> Result<Vec<LegacySpeakerLink>, DbError> {
        let rows = sqlx::query_as::<_, LegacySpeakerLink>(
            "SELECT event_id, member_id FROM meetup_speaker ORDER BY event_id, member_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn fetch_keywords(&self) -> Result<Vec<LegacyKeyword>, DbError> {
        let rows = sqlx::query_as::<_, LegacyKeyword>(
            "SELECT id, label FROM keyword ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn fetch_keyword_links(&self) -> Result<Vec<LegacyKeywordLink>, DbError> {
        let rows = sqlx::query_as::<_, LegacyKeywordLink>(
            "SELECT event_id, keyword_id FROM meetup_keyword ORDER BY event_id, keyword_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn fetch_registrations(&self) -> Result<Vec<LegacyRegistration>, DbError> {
        let rows = sqlx::query_as::<_, LegacyRegistration>(
            "SELECT event_id, member_id, registered_at, no_show \
             FROM meetup_registration ORDER BY event_id, member_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Parse a legacy timestamp, with and without fractional seconds.
///
/// Failing both formats is fatal for the run.
pub fn parse_legacy_datetime(value: &str) -> Result<DateTime<Utc>, ImportError> {
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(ImportError::DateParse(value.to_string()))
}

fn random_opaque(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Reconciler for the legacy SQL database.
pub struct LegacyImporter<'a> {
    organizers: &'a OrganizerMap,
}

impl<'a> LegacyImporter<'a> {
    /// Create an importer with the organizer name mapping.
    #[must_use]
    pub fn new(organizers: &'a OrganizerMap) -> Self {
        Self { organizers }
    }

    /// Run the full import.
    ///
    /// Table order matters: later steps reference records created earlier.
    /// Every step checks whether its target table already has rows and
    /// skips itself when it does, so the run is idempotent at table
    /// granularity, not per row.
    pub async fn run<S: Store>(
        &self,
        legacy: &dyn LegacyDatabase,
        store: &S,
        ledger: &RegistrationLedger<S>,
    ) -> Result<ImportSummary, ImportError> {
        let mut summary = ImportSummary::default();

        self.import_sponsors(legacy, store, &mut summary).await?;
        self.import_members(legacy, store, &mut summary).await?;
        self.import_organizer_placeholders(store, &mut summary).await?;
        let events_imported = self.import_events(legacy, store, &mut summary).await?;
        self.import_keywords(legacy, store, &mut summary).await?;
        if events_imported {
            self.import_speakers(legacy, store, &mut summary).await?;
        }
        self.import_registrations(legacy, store, ledger, &mut summary)
            .await?;
        if events_imported {
            self.enrich_events(store, &mut summary).await?;
        }

        info!(
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            "Legacy database import finished"
        );
        Ok(summary)
    }

    async fn import_sponsors<S: Store>(
        &self,
        legacy: &dyn LegacyDatabase,
        store: &S,
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError> {
        if store.count_sponsors().await? > 0 {
            info!("Sponsors already imported, skipping");
            summary.skipped += 1;
            return Ok(());
        }
        let rows = legacy.fetch_sponsors().await?;
        info!(rows = rows.len(), "Importing legacy sponsors");
        for row in rows {
            store
                .insert_sponsor(NewSponsor {
                    id: Some(row.id),
                    name: row.name,
                    website: row.website,
                    level: row.level,
                    active: row.active,
                })
                .await?;
            summary.created += 1;
        }
        Ok(())
    }

    async fn import_members<S: Store>(
        &self,
        legacy: &dyn LegacyDatabase,
        store: &S,
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError> {
        if store.count_members().await? > 0 {
            info!("Members already imported, skipping");
            summary.skipped += 1;
            return Ok(());
        }
        let rows = legacy.fetch_members().await?;
        info!(rows = rows.len(), "Importing legacy members");
        for row in rows {
            store
                .insert_member(NewMember {
                    id: Some(row.id),
                    email: row.email.unwrap_or_default(),
                    first_name: row.first_name,
                    last_name: row.last_name,
                    company: row.company,
                    is_admin: row.admin,
                    is_active: true,
                    ..NewMember::default()
                })
                .await?;
            summary.created += 1;
        }
        Ok(())
    }

    /// Organizer names mapped in configuration may point at member IDs the
    /// legacy member table never contained (hand-added organizers). Create
    /// those members so that events can reference them.
    async fn import_organizer_placeholders<S: Store>(
        &self,
        store: &S,
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError> {
        for (name, member_id) in self.organizers.entries() {
            if store.find_member(member_id).await?.is_some() {
                continue;
            }
            let (first_name, last_name) = match name.split_once(' ') {
                Some((first, last)) => (first.to_string(), last.to_string()),
                None => (name.to_string(), String::new()),
            };
            store
                .insert_member(NewMember {
                    id: Some(member_id.as_i64()),
                    first_name,
                    last_name,
                    is_active: true,
                    ..NewMember::default()
                })
                .await?;
            info!(member_id = %member_id, "Created organizer placeholder member");
            summary.created += 1;
        }
        Ok(())
    }

    async fn import_events<S: Store>(
        &self,
        legacy: &dyn LegacyDatabase,
        store: &S,
        summary: &mut ImportSummary,
    ) -> Result<bool, ImportError> {
        if store.count_events().await? > 0 {
            info!("Events already imported, skipping");
            summary.skipped += 1;
            return Ok(false);
        }
        let rows = legacy.fetch_events().await?;
        info!(rows = rows.len(), "Importing legacy events");
        for row in rows {
            let starts_at = row
                .starts_at
                .as_deref()
                .map(parse_legacy_datetime)
                .transpose()?;
            let organizer_id = row
                .organizer_name
                .as_deref()
                .and_then(|name| self.organizers.member_for(name))
                .map(|id| id.as_i64());
            if organizer_id.is_none() {
                if let Some(name) = row.organizer_name.as_deref() {
                    warn!(event_id = row.id, organizer = name, "Unmapped organizer name");
                }
            }
            store
                .insert_event(NewEvent {
                    id: Some(row.id),
                    title: row.title,
                    subtitle: row.subtitle,
                    starts_at,
                    duration_minutes: row.duration_minutes,
                    location: row.location,
                    visible: false,
                    capacity: row.capacity,
                    description: row.description,
                    agenda: row.agenda,
                    language: row.language,
                    level: row.level,
                    webinar_url: row.webinar_url,
                    organizer_id,
                })
                .await?;
            summary.created += 1;
        }
        Ok(true)
    }

    async fn import_keywords<S: Store>(
        &self,
        legacy: &dyn LegacyDatabase,
        store: &S,
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError> {
        if store.count_keywords().await? > 0 {
            info!("Keywords already imported, skipping");
            summary.skipped += 1;
            return Ok(());
        }
        let keywords = legacy.fetch_keywords().await?;
        info!(rows = keywords.len(), "Importing legacy keywords");
        for row in keywords {
            store
                .insert_keyword(NewKeyword {
                    id: Some(row.id),
                    label: row.label,
                })
                .await?;
            summary.created += 1;
        }
        for link in legacy.fetch_keyword_links().await? {
            store
                .link_event_keyword(link.event_id.into(), link.keyword_id.into())
                .await?;
        }
        Ok(())
    }

    async fn import_speakers<S: Store>(
        &self,
        legacy: &dyn LegacyDatabase,
        store: &S,
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError> {
        let links = legacy.fetch_speaker_links().await?;
        info!(rows = links.len(), "Importing legacy speaker links");
        for link in links {
            store
                .add_event_speaker(link.event_id.into(), link.member_id.into())
                .await?;
            summary.created += 1;
        }
        Ok(())
    }

    async fn import_registrations<S: Store>(
        &self,
        legacy: &dyn LegacyDatabase,
        store: &S,
        ledger: &RegistrationLedger<S>,
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError> {
        if store.count_registrations().await? > 0 {
            info!("Registrations already imported, skipping");
            summary.skipped += 1;
            return Ok(());
        }
        let rows = legacy.fetch_registrations().await?;
        info!(rows = rows.len(), "Importing legacy registrations");
        for row in rows {
            let event_id = EventId::from_i64(row.event_id);
            let member_id = MemberId::from_i64(row.member_id);

            if store.find_event(event_id).await?.is_none() {
                warn!(
                    event_id = %event_id,
                    member_id = %member_id,
                    "Registration references a missing event, skipping row"
                );
                summary.skipped += 1;
                continue;
            }

            if store.find_member(member_id).await?.is_none() {
                self.synthesize_deleted_member(store, member_id).await?;
                summary.created += 1;
            }

            let registered_at = row
                .registered_at
                .as_deref()
                .map(parse_legacy_datetime)
                .transpose()?
                .unwrap_or_else(Utc::now);

            let outcome = ledger
                .register(
                    event_id,
                    member_id,
                    registered_at,
                    LEGACY_SOURCE,
                    row.no_show,
                    Notify::Suppress,
                )
                .await?;
            if outcome.is_success() {
                summary.created += 1;
            } else {
                summary.skipped += 1;
            }
        }
        Ok(())
    }

    /// The legacy registration table references members that were purged
    /// from the legacy member table. Synthesize an opaque placeholder at
    /// the referenced ID, flagged as deleted, so the registration history
    /// survives.
    async fn synthesize_deleted_member<S: Store>(
        &self,
        store: &S,
        member_id: MemberId,
    ) -> Result<(), ImportError> {
        let opaque = random_opaque(12);
        store
            .insert_member(NewMember {
                id: Some(member_id.as_i64()),
                email: format!("deleted-{}@example.invalid", opaque.to_lowercase()),
                first_name: "Deleted".to_string(),
                last_name: opaque,
                is_active: false,
                deleted: true,
                ..NewMember::default()
            })
            .await?;
        warn!(member_id = %member_id, "Synthesized placeholder for missing member");
        Ok(())
    }

    /// Mark events visible when they carry a date and at least one speaker.
    /// The legacy UI enforced that rule at edit time; the import applies it
    /// once, after speakers are linked.
    async fn enrich_events<S: Store>(
        &self,
        store: &S,
        summary: &mut ImportSummary,
    ) -> Result<(), ImportError> {
        for event in store.list_events().await? {
            if event.visible || event.starts_at.is_none() {
                continue;
            }
            if store.count_event_speakers(event.event_id()).await? > 0 {
                store.set_event_visible(event.event_id(), true).await?;
                summary.updated += 1;
            }
        }
        Ok(())
    }
}
