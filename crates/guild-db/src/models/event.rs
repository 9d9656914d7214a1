//! Event entity model.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use guild_core::EventId;

/// A scheduled community meetup or webinar.
///
/// Visible events are expected to carry a date, language, level, location
/// and at least one speaker; that rule is enforced by the admin edit form
/// and by the legacy import's enrichment step, not by the data layer.
#[derive(Debug, Clone, FromRow)]
pub struct Event {
    /// Unique identifier. May be externally assigned by the legacy system.
    pub id: i64,

    /// Event title.
    pub title: String,

    /// Optional subtitle.
    pub subtitle: Option<String>,

    /// Date and time the event starts.
    pub starts_at: Option<DateTime<Utc>>,

    /// Duration in minutes.
    pub duration_minutes: i32,

    /// Venue, or the webinar platform name for online events.
    pub location: Option<String>,

    /// Whether the event shows up on the public site.
    pub visible: bool,

    /// Registration capacity. 0 means unlimited.
    pub capacity: i32,

    /// Long description.
    pub description: Option<String>,

    /// Agenda text.
    pub agenda: Option<String>,

    /// Talk language (e.g. "EN", "DE").
    pub language: Option<String>,

    /// Audience level (e.g. "Beginner", "Advanced").
    pub level: Option<String>,

    /// Webinar URL; correlation key for the webinar attendance report import.
    pub webinar_url: Option<String>,

    /// Organizing member.
    pub organizer_id: Option<i64>,

    /// When the event was created.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Get the event ID as a typed `EventId`.
    #[must_use]
    pub fn event_id(&self) -> EventId {
        EventId::from_i64(self.id)
    }
}

/// Payload for inserting an event.
#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    pub id: Option<i64>,
    pub title: String,
    pub subtitle: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub duration_minutes: i32,
    pub location: Option<String>,
    pub visible: bool,
    pub capacity: i32,
    pub description: Option<String>,
    pub agenda: Option<String>,
    pub language: Option<String>,
    pub level: Option<String>,
    pub webinar_url: Option<String>,
    pub organizer_id: Option<i64>,
}
