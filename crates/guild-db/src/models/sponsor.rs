//! Sponsor entity model.

use sqlx::FromRow;

/// A sponsoring company shown on the public site.
#[derive(Debug, Clone, FromRow)]
pub struct Sponsor {
    /// Unique identifier. May be externally assigned by the legacy system.
    pub id: i64,

    /// Company name.
    pub name: String,

    /// Company website.
    pub website: Option<String>,

    /// Sponsoring level (e.g. "Gold", "Silver").
    pub level: Option<String>,

    /// Whether the sponsorship is currently active.
    pub active: bool,
}

/// Payload for inserting a sponsor.
#[derive(Debug, Clone, Default)]
pub struct NewSponsor {
    pub id: Option<i64>,
    pub name: String,
    pub website: Option<String>,
    pub level: Option<String>,
    pub active: bool,
}
