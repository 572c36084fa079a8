//! On-disk cache record

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::key::Category;

/// One cached result plus its metadata.
///
/// Serialized as pretty-printed JSON so records stay human-inspectable:
/// `{data, created_at, expires_at, ttl, key, category}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached payload. `null` is a cached negative result.
    pub data: Value,
    /// When the entry was written
    pub created_at: DateTime<Utc>,
    /// `created_at + ttl`
    pub expires_at: DateTime<Utc>,
    /// Time to live in seconds
    pub ttl: u64,
    /// Original un-hashed logical key
    pub key: String,
    /// Producer category
    pub category: Category,
}

impl CacheEntry {
    /// Largest TTL chrono can represent as a duration.
    const MAX_TTL_SECS: u64 = (i64::MAX / 1000) as u64;

    /// Build an entry written at `now`.
    ///
    /// Returns `None` when `now + ttl` is not representable.
    pub fn new(key: &str, category: Category, data: Value, ttl: u64, now: DateTime<Utc>) -> Option<Self> {
        if ttl > Self::MAX_TTL_SECS {
            return None;
        }
        let expires_at = now.checked_add_signed(Duration::seconds(ttl as i64))?;

        Some(Self {
            data,
            created_at: now,
            expires_at,
            ttl,
            key: key.to_string(),
            category,
        })
    }

    /// Whether the entry is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}
