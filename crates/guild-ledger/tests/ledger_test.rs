//! Registration ledger scenarios over the in-memory store.

use std::sync::Arc;

use chrono::Utc;

use guild_db::models::{NewEvent, NewMember};
use guild_db::{EventStore, MemStore, MemberStore, RegistrationStore};
use guild_ledger::{Notify, RecordingNotifier, RegisterOutcome, RegistrationLedger, Template};

fn ledger(
    store: &Arc<MemStore>,
    notifier: &Arc<RecordingNotifier>,
) -> RegistrationLedger<MemStore> {
    RegistrationLedger::new(
        Arc::clone(store),
        Arc::clone(notifier) as Arc<dyn guild_ledger::Notifier>,
        "https://guild.example.org".to_string(),
    )
}

async fn seed_member(store: &MemStore, email: &str) -> guild_core::MemberId {
    store
        .insert_member(NewMember {
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "Member".to_string(),
            is_active: true,
            ..NewMember::default()
        })
        .await
        .unwrap()
        .member_id()
}

async fn seed_event(store: &MemStore, capacity: i32) -> guild_core::EventId {
    store
        .insert_event(NewEvent {
            title: "Rust evening".to_string(),
            capacity,
            ..NewEvent::default()
        })
        .await
        .unwrap()
        .event_id()
}

#[tokio::test]
async fn register_twice_returns_existing_and_creates_no_second_row() {
    let store = Arc::new(MemStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let ledger = ledger(&store, &notifier);

    let event = seed_event(&store, 0).await;
    let member = seed_member(&store, "a@x.com").await;

    let first = ledger
        .register(event, member, Utc::now(), "Web", false, Notify::Suppress)
        .await
        .unwrap();
    assert!(first.is_success());

    let second = ledger
        .register(event, member, Utc::now(), "Web", false, Notify::Suppress)
        .await
        .unwrap();
    assert!(matches!(second, RegisterOutcome::Existing(_)));
    assert_eq!(store.count_registrations_for_event(event).await.unwrap(), 1);
}

#[tokio::test]
async fn capacity_limit_is_never_exceeded_sequentially() {
    let store = Arc::new(MemStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let ledger = ledger(&store, &notifier);

    let event = seed_event(&store, 2).await;
    for i in 0..2 {
        let member = seed_member(&store, &format!("m{i}@x.com")).await;
        assert!(ledger
            .register(event, member, Utc::now(), "Web", false, Notify::Suppress)
            .await
            .unwrap()
            .is_success());
    }

    let third = seed_member(&store, "late@x.com").await;
    let outcome = ledger
        .register(event, third, Utc::now(), "Web", false, Notify::Suppress)
        .await
        .unwrap();
    assert!(matches!(outcome, RegisterOutcome::Full));
    assert_eq!(store.count_registrations_for_event(event).await.unwrap(), 2);
}

#[tokio::test]
async fn deregister_with_unknown_token_returns_false_and_mutates_nothing() {
    let store = Arc::new(MemStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let ledger = ledger(&store, &notifier);

    let event = seed_event(&store, 0).await;
    let member = seed_member(&store, "a@x.com").await;
    ledger
        .register(event, member, Utc::now(), "Web", false, Notify::Suppress)
        .await
        .unwrap();

    assert!(!ledger.deregister("never-issued").await.unwrap());
    assert_eq!(store.count_registrations_for_event(event).await.unwrap(), 1);
}

#[tokio::test]
async fn deregister_with_valid_token_deletes_exactly_once() {
    let store = Arc::new(MemStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let ledger = ledger(&store, &notifier);

    let event = seed_event(&store, 0).await;
    let member = seed_member(&store, "a@x.com").await;
    let RegisterOutcome::Success(registration) = ledger
        .register(event, member, Utc::now(), "Web", false, Notify::Suppress)
        .await
        .unwrap()
    else {
        panic!("expected success");
    };

    assert!(ledger.deregister(&registration.token).await.unwrap());
    assert_eq!(store.count_registrations_for_event(event).await.unwrap(), 0);
    assert!(!ledger.deregister(&registration.token).await.unwrap());
}

#[tokio::test]
async fn registration_confirmation_carries_deregistration_link() {
    let store = Arc::new(MemStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let ledger = ledger(&store, &notifier);

    let event = seed_event(&store, 0).await;
    let member = seed_member(&store, "a@x.com").await;
    let RegisterOutcome::Success(registration) = ledger
        .register(event, member, Utc::now(), "Web", false, Notify::Send)
        .await
        .unwrap()
    else {
        panic!("expected success");
    };

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].template, Template::RegistrationConfirmation);
    assert_eq!(sent[0].recipients, vec!["a@x.com".to_string()]);
    let url = sent[0].vars.get("deregistration_url").unwrap();
    assert_eq!(
        url,
        &format!("https://guild.example.org/deregister/{}", registration.token)
    );
}

#[tokio::test]
async fn suppressed_registration_sends_nothing() {
    let store = Arc::new(MemStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let ledger = ledger(&store, &notifier);

    let event = seed_event(&store, 0).await;
    let member = seed_member(&store, "a@x.com").await;
    ledger
        .register(event, member, Utc::now(), "BigMarker", true, Notify::Suppress)
        .await
        .unwrap();
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn update_no_show_overwrites_flag() {
    let store = Arc::new(MemStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let ledger = ledger(&store, &notifier);

    let event = seed_event(&store, 0).await;
    let member = seed_member(&store, "a@x.com").await;
    let RegisterOutcome::Success(registration) = ledger
        .register(event, member, Utc::now(), "Web", false, Notify::Suppress)
        .await
        .unwrap()
    else {
        panic!("expected success");
    };

    ledger
        .update_no_show(registration.registration_id(), true)
        .await
        .unwrap();
    let stored = store
        .find_registration(event, member)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.no_show);

    ledger
        .update_no_show(registration.registration_id(), false)
        .await
        .unwrap();
    let stored = store
        .find_registration(event, member)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.no_show);
}
