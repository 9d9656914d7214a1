//! Keyword taxonomy model.

use sqlx::FromRow;

use guild_core::KeywordId;

/// A taxonomy keyword attached to events.
#[derive(Debug, Clone, FromRow)]
pub struct Keyword {
    /// Unique identifier. May be externally assigned by the legacy system.
    pub id: i64,

    /// Keyword label.
    pub label: String,
}

impl Keyword {
    /// Get the keyword ID as a typed `KeywordId`.
    #[must_use]
    pub fn keyword_id(&self) -> KeywordId {
        KeywordId::from_i64(self.id)
    }
}

/// Payload for inserting a keyword.
#[derive(Debug, Clone, Default)]
pub struct NewKeyword {
    pub id: Option<i64>,
    pub label: String,
}
