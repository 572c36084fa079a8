//! Venue lookup cache facade
//!
//! Fixes key shapes, categories and default TTLs for the three venue producers:
//! - record store search: `venue_search:<name>:<hints>` in `bigquery`, 30 min
//! - places text search: `places_search:<name>:<location>` in `places_api`, 1 h
//! - venue detail: the place id itself in `venue_detail`, 2 h

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::key::Category;
use crate::manager::CacheManager;
use crate::store::{EntryStore, FileEntryStore};

/// Venue-specific view over a [`CacheManager`].
pub struct VenueCache<'a, S: EntryStore = FileEntryStore> {
    cache: &'a CacheManager<S>,
}

impl<'a, S: EntryStore> VenueCache<'a, S> {
    /// Default TTL for record store search results.
    pub const STORE_SEARCH_TTL_SECS: u64 = 1800;
    /// Default TTL for places text-search results.
    pub const PLACES_SEARCH_TTL_SECS: u64 = 3600;
    /// Default TTL for venue detail records.
    pub const VENUE_DETAIL_TTL_SECS: u64 = 7200;

    pub fn new(cache: &'a CacheManager<S>) -> Self {
        Self { cache }
    }

    pub fn get_store_search<T: DeserializeOwned>(&self, venue_name: &str, location_hints: &str) -> Option<T> {
        self.cache
            .get(&store_search_key(venue_name, location_hints), &Category::BigQuery)
    }

    pub fn set_store_search<T: Serialize + ?Sized>(
        &self,
        venue_name: &str,
        location_hints: &str,
        result: &T,
        ttl: Option<u64>,
    ) {
        self.cache.set(
            &store_search_key(venue_name, location_hints),
            result,
            &Category::BigQuery,
            Some(ttl.unwrap_or(Self::STORE_SEARCH_TTL_SECS)),
        );
    }

    pub fn get_places_search<T: DeserializeOwned>(&self, venue_name: &str, location: &str) -> Option<T> {
        self.cache
            .get(&places_search_key(venue_name, location), &Category::PlacesApi)
    }

    pub fn set_places_search<T: Serialize + ?Sized>(
        &self,
        venue_name: &str,
        location: &str,
        result: &T,
        ttl: Option<u64>,
    ) {
        self.cache.set(
            &places_search_key(venue_name, location),
            result,
            &Category::PlacesApi,
            Some(ttl.unwrap_or(Self::PLACES_SEARCH_TTL_SECS)),
        );
    }

    pub fn get_venue_detail<T: DeserializeOwned>(&self, place_id: &str) -> Option<T> {
        self.cache.get(place_id, &Category::VenueDetail)
    }

    pub fn set_venue_detail<T: Serialize + ?Sized>(&self, place_id: &str, result: &T, ttl: Option<u64>) {
        self.cache.set(
            place_id,
            result,
            &Category::VenueDetail,
            Some(ttl.unwrap_or(Self::VENUE_DETAIL_TTL_SECS)),
        );
    }
}

fn store_search_key(venue_name: &str, location_hints: &str) -> String {
    format!("venue_search:{}:{}", venue_name, location_hints)
}

fn places_search_key(venue_name: &str, location: &str) -> String {
    format!("places_search:{}:{}", venue_name, location)
}
