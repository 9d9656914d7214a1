//! Registration ledger.
//!
//! Enforces one-registration-per-member-per-event and capacity limits,
//! issues deregistration tokens, and fires confirmation notifications.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use guild_core::{EventId, MemberId, RegistrationId};
use guild_db::models::{Event, Member, NewRegistration, Registration};
use guild_db::{EventStore, MemberStore, RegistrationStore};

use crate::error::LedgerError;
use crate::notify::{Notifier, Template};
use crate::token::generate_deregistration_token;

/// Outcome of a registration attempt.
#[derive(Debug, Clone)]
pub enum RegisterOutcome {
    /// A new registration was created.
    Success(Registration),
    /// The member was already registered for the event; nothing was created.
    Existing(Registration),
    /// The event is at capacity; nothing was persisted.
    Full,
}

impl RegisterOutcome {
    /// Whether the attempt created a new registration.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, RegisterOutcome::Success(_))
    }
}

/// Whether a ledger operation should fire its confirmation notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notify {
    Send,
    Suppress,
}

/// The registration ledger service.
pub struct RegistrationLedger<S> {
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
    /// Public base URL used to render deregistration links.
    public_base_url: String,
}

impl<S> RegistrationLedger<S>
where
    S: RegistrationStore + EventStore + MemberStore,
{
    /// Create a ledger over a store and a notification dispatcher.
    pub fn new(store: Arc<S>, notifier: Arc<dyn Notifier>, public_base_url: String) -> Self {
        Self {
            store,
            notifier,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The deregistration link embedded in confirmation messages.
    #[must_use]
    pub fn deregistration_url(&self, token: &str) -> String {
        format!("{}/deregister/{token}", self.public_base_url)
    }

    /// Register a member for an event.
    ///
    /// Idempotent per (event, member): a second attempt returns
    /// [`RegisterOutcome::Existing`] without creating anything. Returns
    /// [`RegisterOutcome::Full`] without persisting when the event declares
    /// a capacity limit that is already reached.
    pub async fn register(
        &self,
        event_id: EventId,
        member_id: MemberId,
        registered_at: DateTime<Utc>,
        source: &str,
        no_show: bool,
        notify: Notify,
    ) -> Result<RegisterOutcome, LedgerError> {
        if let Some(existing) = self.store.find_registration(event_id, member_id).await? {
            return Ok(RegisterOutcome::Existing(existing));
        }

        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(LedgerError::EventNotFound(event_id))?;

        let new = NewRegistration {
            event_id: event_id.as_i64(),
            member_id: member_id.as_i64(),
            registered_at,
            source: source.to_string(),
            no_show,
            token: generate_deregistration_token(),
        };

        let Some(registration) = self
            .store
            .insert_registration_within(new, event.capacity)
            .await?
        else {
            info!(event_id = %event_id, member_id = %member_id, "Event full, registration rejected");
            return Ok(RegisterOutcome::Full);
        };

        info!(
            event_id = %event_id,
            member_id = %member_id,
            source = source,
            "Registration created"
        );

        if notify == Notify::Send {
            let member = self
                .store
                .find_member(member_id)
                .await?
                .ok_or(LedgerError::MemberNotFound(member_id))?;
            if member.has_email() {
                let vars = self.confirmation_vars(&member, &event, Some(&registration.token));
                self.notifier
                    .send(
                        Template::RegistrationConfirmation,
                        &vars,
                        &[member.email.clone()],
                    )
                    .await?;
            }
        }

        Ok(RegisterOutcome::Success(registration))
    }

    /// Deregister via a secret token.
    ///
    /// Returns `false` when no registration carries the token. There is no
    /// temporal guard: deregistering after the event took place is allowed.
    pub async fn deregister(&self, token: &str) -> Result<bool, LedgerError> {
        let Some(registration) = self.store.find_registration_by_token(token).await? else {
            return Ok(false);
        };

        let deleted = self
            .store
            .delete_registration(registration.registration_id())
            .await?;
        if !deleted {
            return Ok(false);
        }

        info!(
            event_id = registration.event_id,
            member_id = registration.member_id,
            "Registration deleted via token"
        );

        let member = self.store.find_member(registration.member()).await?;
        let event = self.store.find_event(registration.event()).await?;
        if let (Some(member), Some(event)) = (member, event) {
            if member.has_email() {
                let vars = self.confirmation_vars(&member, &event, None);
                self.notifier
                    .send(
                        Template::DeregistrationConfirmation,
                        &vars,
                        &[member.email.clone()],
                    )
                    .await?;
            }
        }

        Ok(true)
    }

    /// Unconditionally overwrite the no-show flag of a registration.
    ///
    /// Used by manual admin correction and by bulk import reconciliation.
    pub async fn update_no_show(
        &self,
        registration_id: RegistrationId,
        no_show: bool,
    ) -> Result<(), LedgerError> {
        self.store.set_no_show(registration_id, no_show).await?;
        Ok(())
    }

    fn confirmation_vars(
        &self,
        member: &Member,
        event: &Event,
        token: Option<&str>,
    ) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("member_name".to_string(), member.full_name());
        vars.insert("event_title".to_string(), event.title.clone());
        if let Some(token) = token {
            vars.insert(
                "deregistration_url".to_string(),
                self.deregistration_url(token),
            );
        }
        vars
    }
}
