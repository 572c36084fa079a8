//! Local result cache for flyer-scout producers
//!
//! A file-backed, TTL-based, category-partitioned memoization layer in front
//! of the vision model, the places text search and the venue detail lookups.
//!
//! ## Layout
//!
//! One JSON file per entry under the cache directory, named by
//! `sha256(category ":" key)`:
//!
//! ```text
//! cache/
//!   3f1c...e9.json   {"data": ..., "created_at": ..., "expires_at": ...,
//!   a07b...12.json    "ttl": 1800, "key": "venue_search:Fabric:London",
//!                     "category": "bigquery"}
//! ```
//!
//! ## Lifecycle
//!
//! An entry is fresh until `expires_at`, after which it is logically absent.
//! Expired and unreadable records are deleted lazily by `get`, or eagerly by
//! `clear_expired`. Cache failures never reach callers: a broken cache only
//! turns hits into misses.
//!
//! ## Facades
//!
//! [`VenueCache`] and [`AnalysisCache`] fix key shapes, categories and
//! default TTLs for each producer.

pub mod analysis;
pub mod clock;
pub mod config;
pub mod entry;
pub mod key;
pub mod manager;
pub mod store;
pub mod venue;

pub use analysis::{analysis_key, AnalysisCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use entry::CacheEntry;
pub use key::{digest, Category, EntryId};
pub use manager::{CacheManager, CacheStats, EntrySummary, EvictReason, Lookup};
pub use store::{EntryStore, FileEntryStore, StoreError, StoreResult};
pub use venue::VenueCache;
