//! Import reconciliation scenarios over the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use guild_db::models::{NewEvent, NewMember};
use guild_db::{
    DbError, EventStore, KeywordStore, MemStore, MemberStore, RegistrationStore, SponsorStore,
};
use guild_import::legacy::{
    LegacyEvent, LegacyKeyword, LegacyKeywordLink, LegacyMember, LegacyRegistration,
    LegacySpeakerLink, LegacySponsor,
};
use guild_import::{
    BigMarkerImporter, ClubDeskImporter, CsvWorkbook, ImportError, LegacyDatabase, LegacyImporter,
    OrganizerMap,
};
use guild_ledger::{RecordingNotifier, RegistrationLedger};

fn ledger(store: &Arc<MemStore>) -> RegistrationLedger<MemStore> {
    RegistrationLedger::new(
        Arc::clone(store),
        Arc::new(RecordingNotifier::new()) as Arc<dyn guild_ledger::Notifier>,
        "https://guild.example.org".to_string(),
    )
}

fn bigmarker_book(registered_list: &str) -> CsvWorkbook {
    let mut book = CsvWorkbook::new();
    book.add_sheet(
        "Summary",
        b"Field,Value\nWebinar URL,https://bigmarker.com/guild/rust-evening",
    )
    .unwrap();
    book.add_sheet("Registered List", registered_list.as_bytes())
        .unwrap();
    book
}

async fn seed_webinar_event(store: &MemStore) -> guild_core::EventId {
    store
        .insert_event(NewEvent {
            title: "Rust evening".to_string(),
            webinar_url: Some("https://bigmarker.com/guild/rust-evening".to_string()),
            ..NewEvent::default()
        })
        .await
        .unwrap()
        .event_id()
}

#[tokio::test]
async fn bigmarker_creates_members_and_registrations() {
    let store = Arc::new(MemStore::new());
    let ledger = ledger(&store);
    let event = seed_webinar_event(&store).await;

    let book = bigmarker_book(
        "Email,First Name,Last Name,Registration Date,Attended Live,Unsubscribed\n\
         a@x.com,Ada,Lovelace,2024-03-01 10:00:00,Yes,No\n\
         ,Guest-42,,2024-03-01 10:05:00,No,No",
    );
    let summary = BigMarkerImporter::run(&book, store.as_ref(), &ledger)
        .await
        .unwrap();

    assert_eq!(summary.created, 2);
    assert_eq!(store.count_registrations_for_event(event).await.unwrap(), 2);

    let guest = store
        .find_member_by_email("guest-42@bigmarker.com")
        .await
        .unwrap()
        .expect("guest member created");
    let registration = store
        .find_registration(event, guest.member_id())
        .await
        .unwrap()
        .expect("guest registered");
    assert!(registration.no_show);
    assert_eq!(registration.source, "BigMarker");
}

#[tokio::test]
async fn bigmarker_rerun_is_skipped_entirely() {
    let store = Arc::new(MemStore::new());
    let ledger = ledger(&store);
    let event = seed_webinar_event(&store).await;

    let book = bigmarker_book(
        "Email,First Name,Last Name,Registration Date,Attended Live,Unsubscribed\n\
         a@x.com,Ada,Lovelace,2024-03-01 10:00:00,Yes,No",
    );
    BigMarkerImporter::run(&book, store.as_ref(), &ledger)
        .await
        .unwrap();
    let second = BigMarkerImporter::run(&book, store.as_ref(), &ledger)
        .await
        .unwrap();

    assert_eq!(second.writes(), 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(store.count_registrations_for_event(event).await.unwrap(), 1);
}

#[tokio::test]
async fn bigmarker_updates_no_show_on_existing_registration() {
    let store = Arc::new(MemStore::new());
    let ledger = ledger(&store);
    let event = seed_webinar_event(&store).await;

    let member = store
        .insert_member(NewMember {
            email: "a@x.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            is_active: true,
            ..NewMember::default()
        })
        .await
        .unwrap();
    ledger
        .register(
            event,
            member.member_id(),
            chrono::Utc::now(),
            "Web",
            true,
            guild_ledger::Notify::Suppress,
        )
        .await
        .unwrap();

    let book = bigmarker_book(
        "Email,First Name,Last Name,Registration Date,Attended Live,Unsubscribed\n\
         a@x.com,Ada,Lovelace,2024-03-01 10:00:00,Yes,No",
    );
    let summary = BigMarkerImporter::run(&book, store.as_ref(), &ledger)
        .await
        .unwrap();

    assert_eq!(summary.updated, 1);
    let registration = store
        .find_registration(event, member.member_id())
        .await
        .unwrap()
        .unwrap();
    assert!(!registration.no_show);
    assert_eq!(store.count_registrations_for_event(event).await.unwrap(), 1);
}

#[tokio::test]
async fn bigmarker_unknown_event_aborts_run() {
    let store = Arc::new(MemStore::new());
    let ledger = ledger(&store);

    let book = bigmarker_book(
        "Email,First Name,Last Name,Registration Date,Attended Live,Unsubscribed\n\
         a@x.com,Ada,Lovelace,2024-03-01 10:00:00,Yes,No",
    );
    let err = BigMarkerImporter::run(&book, store.as_ref(), &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::EventNotFound { .. }));
    assert_eq!(store.count_members().await.unwrap(), 0);
}

fn clubdesk_book(rows: &str) -> CsvWorkbook {
    let header = "Mitglieder-ID,E-Mail,Vorname,Nachname,Firma,Strasse,PLZ,Ort,Eintritt,Austritt";
    let mut book = CsvWorkbook::new();
    book.add_sheet("Mitglieder", format!("{header}\n{rows}").as_bytes())
        .unwrap();
    book
}

#[tokio::test]
async fn clubdesk_upserts_by_email_and_overwrites_contact() {
    let store = MemStore::new();
    let existing = store
        .insert_member(NewMember {
            email: "a@x.com".to_string(),
            first_name: "Old".to_string(),
            last_name: "Name".to_string(),
            city: Some("Bern".to_string()),
            is_active: true,
            ..NewMember::default()
        })
        .await
        .unwrap();

    let book = clubdesk_book(
        "7,a@x.com,Ada,Lovelace,Analytical Engines,Bahnhofstrasse 1,8000.0,Zuerich,01.01.2020,\n\
         8,new@x.com,Grace,Hopper,,,,Basel,01.06.2021,31.12.2024",
    );
    let summary = ClubDeskImporter::run(&book, &store).await.unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.created, 1);

    let updated = store.find_member(existing.member_id()).await.unwrap().unwrap();
    assert_eq!(updated.first_name, "Ada");
    assert_eq!(updated.zip_code.as_deref(), Some("8000"));
    assert_eq!(updated.city.as_deref(), Some("Zuerich"));
    assert_eq!(
        updated.membership_begin,
        Some(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
    );

    let created = store.find_member_by_email("new@x.com").await.unwrap().unwrap();
    assert_eq!(
        created.membership_end,
        Some(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap())
    );
}

#[tokio::test]
async fn clubdesk_matches_admin_entered_mixed_case_email() {
    let store = MemStore::new();
    let existing = store
        .insert_member(NewMember {
            email: "Ada.Lovelace@X.com".to_string(),
            first_name: "Old".to_string(),
            last_name: "Name".to_string(),
            is_active: true,
            ..NewMember::default()
        })
        .await
        .unwrap();

    let book = clubdesk_book("7,ada.lovelace@x.com,Ada,Lovelace,,,,,01.01.2020,");
    let summary = ClubDeskImporter::run(&book, &store).await.unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.created, 0);
    assert_eq!(store.count_members().await.unwrap(), 1);

    let updated = store.find_member(existing.member_id()).await.unwrap().unwrap();
    assert_eq!(updated.first_name, "Ada");
}

#[tokio::test]
async fn clubdesk_rerun_is_skipped_entirely() {
    let store = MemStore::new();
    let book = clubdesk_book("7,a@x.com,Ada,Lovelace,,,,,01.01.2020,");

    ClubDeskImporter::run(&book, &store).await.unwrap();
    let second = ClubDeskImporter::run(&book, &store).await.unwrap();

    assert_eq!(second.writes(), 0);
    assert_eq!(store.count_members().await.unwrap(), 1);
}

/// Fixed legacy dataset for the replay tests.
#[derive(Default)]
struct StubLegacy {
    missing_registration_member: bool,
}

#[async_trait]
impl LegacyDatabase for StubLegacy {
    async fn fetch_sponsors(&self) -> Result<Vec<LegacySponsor>, DbError> {
        Ok(vec![LegacySponsor {
            id: 1,
            name: "Ferris Works".to_string(),
            website: Some("https://ferris.example".to_string()),
            level: Some("Gold".to_string()),
            active: true,
        }])
    }

    async fn fetch_members(&self) -> Result<Vec<LegacyMember>, DbError> {
        Ok(vec![LegacyMember {
            id: 10,
            email: Some("a@x.com".to_string()),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            company: None,
            admin: false,
        }])
    }

    async fn fetch_events(&self) -> Result<Vec<LegacyEvent>, DbError> {
        Ok(vec![LegacyEvent {
            id: 100,
            title: "Rust evening".to_string(),
            subtitle: None,
            starts_at: Some("2019-06-12 18:30:00".to_string()),
            duration_minutes: 90,
            location: Some("Zuerich".to_string()),
            capacity: 0,
            description: None,
            agenda: None,
            language: Some("EN".to_string()),
            level: Some("Beginner".to_string()),
            webinar_url: None,
            organizer_name: Some("Grace Hopper".to_string()),
        }])
    }

    async fn fetch_speaker_links(&self) -> Result<Vec<LegacySpeakerLink>, DbError> {
        Ok(vec![LegacySpeakerLink {
            event_id: 100,
            member_id: 10,
        }])
    }

    async fn fetch_keywords(&self) -> Result<Vec<LegacyKeyword>, DbError> {
        Ok(vec![LegacyKeyword {
            id: 5,
            label: "Embedded".to_string(),
        }])
    }

    async fn fetch_keyword_links(&self) -> Result<Vec<LegacyKeywordLink>, DbError> {
        Ok(vec![LegacyKeywordLink {
            event_id: 100,
            keyword_id: 5,
        }])
    }

    async fn fetch_registrations(&self) -> Result<Vec<LegacyRegistration>, DbError> {
        let mut rows = vec![LegacyRegistration {
            event_id: 100,
            member_id: 10,
            registered_at: Some("2019-06-01 12:00:00.500".to_string()),
            no_show: false,
        }];
        if self.missing_registration_member {
            rows.push(LegacyRegistration {
                event_id: 100,
                member_id: 999,
                registered_at: Some("2019-06-02 12:00:00".to_string()),
                no_show: true,
            });
        }
        Ok(rows)
    }
}

fn organizers() -> OrganizerMap {
    OrganizerMap::from_toml_str("[organizers]\n\"Grace Hopper\" = 20\n").unwrap()
}

#[tokio::test]
async fn legacy_import_replays_all_tables_in_order() {
    let store = Arc::new(MemStore::new());
    let ledger = ledger(&store);
    let map = organizers();

    let summary = LegacyImporter::new(&map)
        .run(&StubLegacy::default(), store.as_ref(), &ledger)
        .await
        .unwrap();
    assert!(summary.writes() > 0);

    assert_eq!(store.count_sponsors().await.unwrap(), 1);
    // Legacy member plus the organizer placeholder.
    assert_eq!(store.count_members().await.unwrap(), 2);
    assert_eq!(store.count_events().await.unwrap(), 1);
    assert_eq!(store.count_keywords().await.unwrap(), 1);
    assert_eq!(store.count_registrations().await.unwrap(), 1);

    let event = store
        .find_event(guild_core::EventId::from_i64(100))
        .await
        .unwrap()
        .expect("event imported at its legacy ID");
    assert_eq!(event.organizer_id, Some(20));
    // Enrichment: has a date and a speaker, so it went visible.
    assert!(event.visible);

    let organizer = store
        .find_member(guild_core::MemberId::from_i64(20))
        .await
        .unwrap()
        .expect("organizer placeholder created");
    assert_eq!(organizer.first_name, "Grace");
}

#[tokio::test]
async fn legacy_import_rerun_performs_zero_writes() {
    let store = Arc::new(MemStore::new());
    let ledger = ledger(&store);
    let map = organizers();
    let importer = LegacyImporter::new(&map);

    importer
        .run(&StubLegacy::default(), store.as_ref(), &ledger)
        .await
        .unwrap();
    let second = importer
        .run(&StubLegacy::default(), store.as_ref(), &ledger)
        .await
        .unwrap();

    assert_eq!(second.writes(), 0);
    assert_eq!(store.count_members().await.unwrap(), 2);
    assert_eq!(store.count_registrations().await.unwrap(), 1);
}

#[tokio::test]
async fn legacy_import_synthesizes_placeholder_for_missing_member() {
    let store = Arc::new(MemStore::new());
    let ledger = ledger(&store);
    let map = organizers();

    let legacy = StubLegacy {
        missing_registration_member: true,
    };
    LegacyImporter::new(&map)
        .run(&legacy, store.as_ref(), &ledger)
        .await
        .unwrap();

    let placeholder = store
        .find_member(guild_core::MemberId::from_i64(999))
        .await
        .unwrap()
        .expect("placeholder member created at legacy ID");
    assert!(placeholder.deleted);
    assert!(!placeholder.is_active);

    assert_eq!(store.count_registrations().await.unwrap(), 2);
}
