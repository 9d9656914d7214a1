//! Organizer name mapping.
//!
//! The legacy database stores event organizers as free-text names. The
//! mapping from those names to member IDs is operationally static data,
//! so it lives in a TOML file loaded at startup rather than in code.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use guild_core::MemberId;

use crate::error::ImportError;

/// Mapping from legacy organizer names to member IDs.
///
/// ```toml
/// [organizers]
/// "Ada Lovelace" = 101
/// "Grace Hopper" = 102
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizerMap {
    #[serde(default)]
    organizers: HashMap<String, i64>,
}

impl OrganizerMap {
    /// Load the mapping from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ImportError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ImportError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse the mapping from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ImportError> {
        toml::from_str(raw).map_err(|e| ImportError::Config(e.to_string()))
    }

    /// Member ID for a legacy organizer name, if mapped.
    #[must_use]
    pub fn member_for(&self, name: &str) -> Option<MemberId> {
        self.organizers.get(name.trim()).copied().map(MemberId::from_i64)
    }

    /// All mapped (name, member ID) pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&str, MemberId)> {
        self.organizers
            .iter()
            .map(|(name, id)| (name.as_str(), MemberId::from_i64(*id)))
    }

    /// Number of mapped organizers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.organizers.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.organizers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_lookup() {
        let map = OrganizerMap::from_toml_str(
            "[organizers]\n\"Ada Lovelace\" = 101\n\"Grace Hopper\" = 102\n",
        )
        .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.member_for("Ada Lovelace"), Some(MemberId::from_i64(101)));
        assert_eq!(map.member_for(" Ada Lovelace "), Some(MemberId::from_i64(101)));
        assert_eq!(map.member_for("Unknown"), None);
    }

    #[test]
    fn test_empty_document_is_empty_map() {
        let map = OrganizerMap::from_toml_str("").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            OrganizerMap::from_toml_str("[organizers\n"),
            Err(ImportError::Config(_))
        ));
    }
}
