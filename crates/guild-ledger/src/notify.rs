//! Notification dispatcher collaborator boundary.
//!
//! The ledger fires templated emails on registration and deregistration.
//! Actual SMTP delivery lives behind the [`Notifier`] trait; the bundled
//! [`EmailNotifier`] renders the message and logs it, gated by its
//! configuration. Failures propagate synchronously to the caller.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during notification dispatch.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The notifier is enabled but misconfigured.
    #[error("Notification configuration error: {0}")]
    Configuration(String),

    /// The message could not be delivered.
    #[error("Failed to send notification: {0}")]
    SendFailed(String),
}

/// Message templates the ledger can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    /// Sent after a successful registration; carries the deregistration link.
    RegistrationConfirmation,
    /// Sent after a successful deregistration.
    DeregistrationConfirmation,
}

impl Template {
    /// Subject line for the template.
    #[must_use]
    pub fn subject(&self) -> &'static str {
        match self {
            Template::RegistrationConfirmation => "Your registration is confirmed",
            Template::DeregistrationConfirmation => "Your registration has been cancelled",
        }
    }
}

/// Notification dispatcher boundary.
///
/// `send` is fire-and-forget from the caller's perspective but synchronous:
/// an `Err` propagates to the caller as a failure of the enclosing
/// operation.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a templated message to the given recipients.
    async fn send(
        &self,
        template: Template,
        vars: &HashMap<String, String>,
        recipients: &[String],
    ) -> Result<(), NotifyError>;
}

/// Configuration for the email notifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Whether notifications are enabled.
    pub enabled: bool,
    /// From email address.
    pub from_email: Option<String>,
    /// From display name.
    pub from_name: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            from_email: None,
            from_name: Some("guild".to_string()),
        }
    }
}

/// Config-gated email notifier.
///
/// Renders subject and body for the template and logs the outgoing message
/// with structured fields. Mail transport is a collaborator outside this
/// crate; a disabled notifier is a no-op.
pub struct EmailNotifier {
    config: NotifyConfig,
}

impl EmailNotifier {
    /// Create a new notifier.
    #[must_use]
    pub fn new(config: NotifyConfig) -> Self {
        Self { config }
    }

    /// Create a disabled notifier.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(NotifyConfig::default())
    }

    /// Check if notifications are enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn render_body(template: Template, vars: &HashMap<String, String>) -> String {
        let get = |key: &str| vars.get(key).map(String::as_str).unwrap_or("");
        match template {
            Template::RegistrationConfirmation => format!(
                r"Hi {},

You are registered for: {}

If you cannot make it, you can deregister here:
{}

See you there!
",
                get("member_name"),
                get("event_title"),
                get("deregistration_url"),
            ),
            Template::DeregistrationConfirmation => format!(
                r"Hi {},

Your registration for {} has been cancelled.

We hope to see you at another event.
",
                get("member_name"),
                get("event_title"),
            ),
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(
        &self,
        template: Template,
        vars: &HashMap<String, String>,
        recipients: &[String],
    ) -> Result<(), NotifyError> {
        if !self.config.enabled {
            debug!("Notifications disabled, skipping");
            return Ok(());
        }

        let from_email = self.config.from_email.as_ref().ok_or_else(|| {
            NotifyError::Configuration("From email not configured".to_string())
        })?;

        let subject = template.subject();
        let body = Self::render_body(template, vars);

        info!(
            from = %from_email,
            recipients = recipients.join(", "),
            subject = subject,
            "Sending notification"
        );
        debug!(body = %body, "Notification body");

        Ok(())
    }
}

/// Notifier that records every message, for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
}

/// A message captured by [`RecordingNotifier`].
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub template: Template,
    pub vars: HashMap<String, String>,
    pub recipients: Vec<String>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        template: Template,
        vars: &HashMap<String, String>,
        recipients: &[String],
    ) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(SentMessage {
                template,
                vars: vars.clone(),
                recipients: recipients.to_vec(),
            });
        Ok(())
    }
}
