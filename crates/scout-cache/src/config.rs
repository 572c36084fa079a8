//! Cache configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration handed to [`crate::CacheManager::open`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one JSON file per entry
    #[serde(rename = "dir")]
    pub cache_dir: PathBuf,
    /// TTL applied when `set` is called without one
    pub default_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            default_ttl_secs: 3600, // 1 hour
        }
    }
}

impl CacheConfig {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_default_ttl(mut self, secs: u64) -> Self {
        self.default_ttl_secs = secs;
        self
    }
}
