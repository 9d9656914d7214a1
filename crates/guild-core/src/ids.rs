//! Strongly typed identifiers.
//!
//! Member, event and registration IDs are plain `i64` values at the database
//! layer because the legacy systems assign numeric IDs that must be preserved
//! on import. The newtype pattern keeps the different ID spaces apart at
//! compile time.
//!
//! # Example
//!
//! ```
//! use guild_core::{EventId, MemberId};
//!
//! let member = MemberId::from_i64(42);
//!
//! // Type safety: cannot pass an EventId where a MemberId is expected
//! fn requires_member(id: MemberId) -> String {
//!     id.to_string()
//! }
//!
//! let result = requires_member(member);
//! assert_eq!(result, "42");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Error type for ID parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The underlying integer parse error message.
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed ID type over `i64`.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an ID from a raw integer.
            #[must_use]
            pub fn from_i64(id: i64) -> Self {
                Self(id)
            }

            /// Returns the underlying integer.
            #[must_use]
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.parse::<i64>().map(Self).map_err(|e| ParseIdError {
                    id_type: stringify!($name),
                    message: e.to_string(),
                })
            }
        }
    };
}

define_id!(
    /// Strongly typed identifier for members.
    ///
    /// Member IDs may be externally assigned by the legacy membership
    /// systems, so unlike a surrogate key they carry meaning across imports.
    MemberId
);

define_id!(
    /// Strongly typed identifier for events.
    EventId
);

define_id!(
    /// Strongly typed identifier for registrations.
    RegistrationId
);

define_id!(
    /// Strongly typed identifier for keywords.
    KeywordId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_i64_preserves_value() {
        let id = MemberId::from_i64(17);
        assert_eq!(id.as_i64(), 17);
    }

    #[test]
    fn test_display_returns_integer_string() {
        let id = EventId::from_i64(4711);
        assert_eq!(id.to_string(), "4711");
    }

    #[test]
    fn test_parse_from_string() {
        let id: MemberId = "123".parse().unwrap();
        assert_eq!(id, MemberId::from_i64(123));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "not-a-number".parse::<RegistrationId>().unwrap_err();
        assert_eq!(err.id_type, "RegistrationId");
    }

    #[test]
    fn test_ids_are_distinct_types() {
        // Compile-time check: MemberId and EventId do not compare.
        let member = MemberId::from_i64(1);
        let event = EventId::from_i64(1);
        assert_eq!(member.as_i64(), event.as_i64());
    }

    #[test]
    fn test_serde_transparent() {
        let id = MemberId::from_i64(9);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "9");
        let back: MemberId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
