//! Cache manager
//!
//! Owns TTL semantics on top of an [`EntryStore`]:
//! - `get` resolves expiry lazily and deletes expired or unreadable records
//! - `set` never fails the caller; write errors are logged and dropped
//! - bulk clears and stats are O(n) scans over every stored identifier
//!
//! ## Failure policy
//!
//! Nothing here returns an error. A broken cache only costs performance:
//! lookups degrade to misses and writes degrade to "not cached".

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::entry::CacheEntry;
use crate::key::{digest, Category, EntryId};
use crate::store::{EntryStore, FileEntryStore, StoreError, StoreResult};

/// Outcome of a single lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// Fresh entry
    Hit(T),
    /// No record for this identifier
    Miss,
    /// A record existed but could not be served; it has been deleted.
    Evicted(EvictReason),
}

/// Why a lookup removed the record it found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictReason {
    Expired,
    Corrupt,
}

impl<T> Lookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::Evicted(_) => None,
        }
    }
}

/// Aggregate statistics over the whole store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Every stored record, readable or not
    pub total_entries: usize,
    /// Parseable records per category label
    pub per_category: BTreeMap<String, usize>,
    pub total_bytes: u64,
    /// `total_bytes` in MiB, two decimals
    pub total_megabytes: f64,
    /// Parseable records past their expiry
    pub expired_count: usize,
}

/// Diagnostic view of one parseable record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySummary {
    pub id: EntryId,
    pub category: Category,
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
}

/// Why a stored record could not be loaded.
enum LoadError {
    Missing,
    Unreadable(String),
}

/// TTL cache over an [`EntryStore`].
pub struct CacheManager<S: EntryStore = FileEntryStore> {
    store: S,
    default_ttl_secs: u64,
    clock: Arc<dyn Clock>,
}

impl CacheManager<FileEntryStore> {
    /// Open a file-backed cache, creating the directory if needed.
    pub fn open(config: &CacheConfig) -> StoreResult<Self> {
        let store = FileEntryStore::new(&config.cache_dir)?;
        Ok(Self::with_store(store, config.default_ttl_secs))
    }
}

impl<S: EntryStore> CacheManager<S> {
    /// Wrap an existing store.
    pub fn with_store(store: S, default_ttl_secs: u64) -> Self {
        Self {
            store,
            default_ttl_secs,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn default_ttl_secs(&self) -> u64 {
        self.default_ttl_secs
    }

    /// Look up `key`, reporting why nothing was returned.
    ///
    /// Expired and unreadable records are deleted as a side effect, so the
    /// same bad record is never reported twice. A well-formed record whose
    /// payload does not deserialize into `T` is a miss and stays in place.
    pub fn lookup<T: DeserializeOwned>(&self, key: &str, category: &Category) -> Lookup<T> {
        let id = digest(category, key);

        let entry = match self.load(&id) {
            Ok(entry) => entry,
            Err(LoadError::Missing) => {
                debug!(%category, key, "Cache miss");
                return Lookup::Miss;
            }
            Err(LoadError::Unreadable(reason)) => {
                warn!(%category, key, %reason, "Corrupt cache entry, removing");
                self.remove(&id);
                return Lookup::Evicted(EvictReason::Corrupt);
            }
        };

        if entry.is_expired_at(self.clock.now()) {
            debug!(%category, key, expires_at = %entry.expires_at, "Cache entry expired, removing");
            self.remove(&id);
            return Lookup::Evicted(EvictReason::Expired);
        }

        match serde_json::from_value(entry.data) {
            Ok(value) => {
                debug!(%category, key, "Cache hit");
                Lookup::Hit(value)
            }
            Err(e) => {
                debug!(%category, key, error = %e, "Cached payload does not match requested type");
                Lookup::Miss
            }
        }
    }

    /// Fetch a fresh cached value, or `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, category: &Category) -> Option<T> {
        self.lookup(key, category).into_option()
    }

    /// Cache `value` under `key` for `ttl` seconds (default TTL when `None`).
    ///
    /// Failures are logged and swallowed.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, category: &Category, ttl: Option<u64>) {
        let ttl = ttl.unwrap_or(self.default_ttl_secs);
        if ttl == 0 {
            warn!(%category, key, "Refusing to cache with zero TTL");
            return;
        }

        let data = match serde_json::to_value(value) {
            Ok(data) => data,
            Err(e) => {
                warn!(%category, key, error = %e, "Cache write failed: payload not serializable");
                return;
            }
        };

        let Some(entry) = CacheEntry::new(key, category.clone(), data, ttl, self.clock.now()) else {
            warn!(%category, key, ttl, "Cache write failed: TTL out of range");
            return;
        };

        let bytes = match entry.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(%category, key, error = %e, "Cache write failed: encoding");
                return;
            }
        };

        match self.store.write(&digest(category, key), &bytes) {
            Ok(()) => info!(%category, key, ttl, "Cached"),
            Err(e) => warn!(%category, key, error = %e, "Cache write failed"),
        }
    }

    /// Whether a record (fresh or not) is physically present for `key`.
    pub fn contains_record(&self, key: &str, category: &Category) -> bool {
        self.store.size_of(&digest(category, key)).is_ok()
    }

    /// Delete every readable entry in `category`. Unreadable entries are left alone.
    pub fn clear_category(&self, category: &Category) -> usize {
        let mut cleared = 0;

        for id in self.scan() {
            let Ok(entry) = self.load(&id) else {
                continue;
            };
            if &entry.category == category && self.remove(&id) {
                cleared += 1;
            }
        }

        info!(%category, cleared, "Cleared cache category");
        cleared
    }

    /// Delete expired entries and anything unreadable.
    pub fn clear_expired(&self) -> usize {
        let now = self.clock.now();
        let mut cleared = 0;

        for id in self.scan() {
            let stale = match self.load(&id) {
                Ok(entry) => entry.is_expired_at(now),
                Err(LoadError::Unreadable(_)) => true,
                Err(LoadError::Missing) => false,
            };
            if stale && self.remove(&id) {
                cleared += 1;
            }
        }

        let orphans = self.sweep_orphans();
        info!(cleared, orphans, "Cleared expired cache entries");
        cleared
    }

    /// Delete every entry, including records with foreign names.
    pub fn clear_all(&self) -> usize {
        let mut cleared = self.scan().iter().filter(|id| self.remove(id)).count();
        cleared += match self.store.remove_foreign_records() {
            Ok(removed) => removed,
            Err(e) => {
                warn!(error = %e, "Failed to remove foreign cache records");
                0
            }
        };

        let orphans = self.sweep_orphans();
        info!(cleared, orphans, "Cleared all cache entries");
        cleared
    }

    /// Scan the store and summarize it.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let mut stats = CacheStats::default();

        for id in self.scan() {
            let Ok(size) = self.store.size_of(&id) else {
                continue;
            };
            stats.total_entries += 1;
            stats.total_bytes += size;

            if let Ok(entry) = self.load(&id) {
                *stats
                    .per_category
                    .entry(entry.category.as_str().to_string())
                    .or_insert(0) += 1;
                if entry.is_expired_at(now) {
                    stats.expired_count += 1;
                }
            }
        }

        stats.total_megabytes = (stats.total_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0;
        stats
    }

    /// List readable entries, sorted by category then key.
    pub fn entries(&self) -> Vec<EntrySummary> {
        let now = self.clock.now();
        let mut entries: Vec<EntrySummary> = self
            .scan()
            .into_iter()
            .filter_map(|id| {
                let entry = self.load(&id).ok()?;
                Some(EntrySummary {
                    expired: entry.is_expired_at(now),
                    id,
                    category: entry.category,
                    key: entry.key,
                    created_at: entry.created_at,
                    expires_at: entry.expires_at,
                })
            })
            .collect();

        entries.sort_by(|a, b| (&a.category, &a.key).cmp(&(&b.category, &b.key)));
        entries
    }

    fn load(&self, id: &EntryId) -> Result<CacheEntry, LoadError> {
        let bytes = match self.store.read(id) {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound(_)) => return Err(LoadError::Missing),
            Err(e) => return Err(LoadError::Unreadable(e.to_string())),
        };
        CacheEntry::from_bytes(&bytes).map_err(|e| LoadError::Unreadable(e.to_string()))
    }

    fn scan(&self) -> Vec<EntryId> {
        match self.store.list_ids() {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "Failed to list cache entries");
                Vec::new()
            }
        }
    }

    fn sweep_orphans(&self) -> usize {
        match self.store.cleanup_orphaned_temps() {
            Ok(cleaned) => cleaned,
            Err(e) => {
                warn!(error = %e, "Failed to clean up orphaned temp files");
                0
            }
        }
    }

    /// Delete a record, returning whether it was removed.
    fn remove(&self, id: &EntryId) -> bool {
        match self.store.delete(id) {
            Ok(removed) => removed,
            Err(e) => {
                warn!(%id, error = %e, "Failed to delete cache entry");
                false
            }
        }
    }
}
