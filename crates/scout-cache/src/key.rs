//! Cache identifiers and categories
//!
//! Every record is addressed by `sha256(category ":" logical_key)` rendered as
//! lowercase hex. The identifier is the only lookup path; there is no
//! secondary index by category or expiry.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Producer category partitioning the key space.
///
/// Known producers have their own variants so a typo fails to compile.
/// Anything else is carried as [`Category::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Category {
    /// Catch-all used when callers do not name a category
    #[default]
    General,
    /// Venue record store search results
    BigQuery,
    /// Places text-search results
    PlacesApi,
    /// Venue detail records
    VenueDetail,
    /// Vision-model flyer analysis
    VisionAnalysis,
    /// Any other label
    Other(String),
}

impl Category {
    /// Parse from a stored label. Unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "general" => Self::General,
            "bigquery" => Self::BigQuery,
            "places_api" => Self::PlacesApi,
            "venue_detail" => Self::VenueDetail,
            "vision_analysis" => Self::VisionAnalysis,
            other => Self::Other(other.to_string()),
        }
    }

    /// Stable label written into records and mixed into identifiers.
    pub fn as_str(&self) -> &str {
        match self {
            Self::General => "general",
            Self::BigQuery => "bigquery",
            Self::PlacesApi => "places_api",
            Self::VenueDetail => "venue_detail",
            Self::VisionAnalysis => "vision_analysis",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// Fixed-width hashed address of a cache record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Length of an identifier in hex characters.
    pub const LEN: usize = 64;

    /// Wrap an identifier read back from storage.
    ///
    /// Returns `None` unless the value is exactly 64 lowercase hex digits.
    pub fn parse(value: &str) -> Option<Self> {
        let valid = value.len() == Self::LEN
            && value
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        valid.then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the identifier for a (category, logical key) pair.
pub fn digest(category: &Category, logical_key: &str) -> EntryId {
    let mut hasher = Sha256::new();
    hasher.update(category.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(logical_key.as_bytes());
    EntryId(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        let a = digest(&Category::PlacesApi, "places_search:Fabric:London");
        let b = digest(&Category::PlacesApi, "places_search:Fabric:London");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), EntryId::LEN);
    }

    #[test]
    fn test_digest_separates_categories() {
        let a = digest(&Category::from_label("a"), "x");
        let b = digest(&Category::from_label("b"), "x");
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_matches_joined_input() {
        // sha256("general:hello")
        let mut hasher = Sha256::new();
        hasher.update(b"general:hello");
        let expected = hex::encode(hasher.finalize());

        assert_eq!(digest(&Category::General, "hello").as_str(), expected);
    }

    #[test]
    fn test_category_labels_round_trip() {
        for category in [
            Category::General,
            Category::BigQuery,
            Category::PlacesApi,
            Category::VenueDetail,
            Category::VisionAnalysis,
            Category::Other("custom".to_string()),
        ] {
            assert_eq!(Category::from_label(category.as_str()), category);
        }
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&Category::VisionAnalysis).unwrap();
        assert_eq!(json, "\"vision_analysis\"");

        let parsed: Category = serde_json::from_str("\"bigquery\"").unwrap();
        assert_eq!(parsed, Category::BigQuery);
    }

    #[test]
    fn test_entry_id_parse_rejects_garbage() {
        let id = digest(&Category::General, "k");
        assert_eq!(EntryId::parse(id.as_str()), Some(id));
        assert!(EntryId::parse("not-a-hash").is_none());
        assert!(EntryId::parse(&"A".repeat(64)).is_none());
    }
}
