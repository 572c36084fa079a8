//! Venue resolution
//!
//! Turns a venue name into a place record: places text search, then the
//! persistent venue store, then the place detail API. Every step goes
//! through [`VenueCache`] when one is configured.

mod parse;

pub use parse::{parse_detail_response, parse_text_search};

use std::thread;
use std::time::Duration;

use scout_cache::{EntryStore, FileEntryStore, VenueCache};
use scout_model::{EnrichedEvent, FlyerEvent, TextSearchHit, VenueDetail};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ProducerResult;

/// Places text search endpoint.
pub trait PlaceSearch {
    /// Raw search response for a free-text query.
    fn search_text(&self, query: &str) -> ProducerResult<Value>;
}

/// Place detail endpoint.
pub trait PlaceDetails {
    /// Raw detail response for a place id.
    fn fetch_detail(&self, place_id: &str) -> ProducerResult<Value>;
}

/// Persistent venue records keyed by place id.
pub trait VenueStore {
    fn find(&self, place_id: &str) -> ProducerResult<Option<VenueDetail>>;
    fn save(&self, detail: &VenueDetail) -> ProducerResult<()>;
}

/// Resolves venue names to place records.
pub struct VenueResolver<'a, S: EntryStore = FileEntryStore> {
    search: &'a dyn PlaceSearch,
    details: &'a dyn PlaceDetails,
    store: &'a dyn VenueStore,
    cache: Option<VenueCache<'a, S>>,
    request_interval: Duration,
}

impl<'a, S: EntryStore> VenueResolver<'a, S> {
    /// How long a search with no results is remembered.
    pub const NEGATIVE_TTL_SECS: u64 = 300;

    pub fn new(
        search: &'a dyn PlaceSearch,
        details: &'a dyn PlaceDetails,
        store: &'a dyn VenueStore,
        cache: Option<VenueCache<'a, S>>,
    ) -> Self {
        Self {
            search,
            details,
            store,
            cache,
            request_interval: Duration::from_millis(100),
        }
    }

    /// Pause between events during [`enrich`](Self::enrich).
    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = interval;
        self
    }

    /// Best place match for `venue` near `location`.
    ///
    /// A cached "no results" answer is honored. Search errors are not cached.
    pub fn text_search(&self, venue: &str, location: &str) -> Option<TextSearchHit> {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get_places_search::<Option<TextSearchHit>>(venue, location) {
                debug!(venue, location, found = cached.is_some(), "Text search served from cache");
                return cached;
            }
        }

        let query = format!("{} {}", venue, location);
        let response = match self.search.search_text(&query) {
            Ok(response) => response,
            Err(e) => {
                warn!(venue, location, error = %e, "Text search failed");
                return None;
            }
        };

        let hit = parse_text_search(&response);
        if let Some(cache) = &self.cache {
            match &hit {
                Some(hit) => cache.set_places_search(venue, location, &Some(hit), None),
                None => cache.set_places_search(
                    venue,
                    location,
                    &None::<TextSearchHit>,
                    Some(Self::NEGATIVE_TTL_SECS),
                ),
            }
        }
        hit
    }

    /// Venue record from the persistent store, through the detail cache.
    pub fn venue_from_store(&self, place_id: &str) -> Option<VenueDetail> {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get_venue_detail::<VenueDetail>(place_id) {
                debug!(place_id, "Venue detail served from cache");
                return Some(cached);
            }
        }

        match self.store.find(place_id) {
            Ok(Some(detail)) => {
                info!(place_id, "Venue found in store");
                if let Some(cache) = &self.cache {
                    cache.set_venue_detail(place_id, &detail, None);
                }
                Some(detail)
            }
            Ok(None) => {
                debug!(place_id, "Venue not in store");
                None
            }
            Err(e) => {
                warn!(place_id, error = %e, "Venue store lookup failed");
                None
            }
        }
    }

    /// Venue record: cache, then store, then the detail API.
    ///
    /// Records fetched from the API are saved to the store and cached.
    pub fn venue_details(&self, place_id: &str) -> Option<VenueDetail> {
        if let Some(detail) = self.venue_from_store(place_id) {
            return Some(detail);
        }

        debug!(place_id, "Calling place detail API");
        let response = match self.details.fetch_detail(place_id) {
            Ok(response) => response,
            Err(e) => {
                warn!(place_id, error = %e, "Place detail request failed");
                return None;
            }
        };

        let detail = parse_detail_response(place_id, &response);
        if let Err(e) = self.store.save(&detail) {
            warn!(place_id, error = %e, "Failed to save venue to store");
        }
        if let Some(cache) = &self.cache {
            cache.set_venue_detail(place_id, &detail, None);
        }

        info!(place_id, "Venue detail retrieved");
        Some(detail)
    }

    /// Search and detail data for one event. Empty when the event has no venue.
    pub fn enrich_event(&self, event: &FlyerEvent) -> EnrichedEvent {
        let mut enriched = EnrichedEvent {
            event: event.clone(),
            ..EnrichedEvent::default()
        };

        let Some(venue) = event.venue.as_deref() else {
            debug!(event = ?event.event_name, "No venue name, skipping lookup");
            return enriched;
        };
        let location = event.location.as_deref().unwrap_or_default();

        let Some(hit) = self.text_search(venue, location) else {
            info!(venue, location, "Venue not found");
            return enriched;
        };

        enriched.detail = self.venue_details(&hit.place_id);
        if enriched.detail.is_none() {
            warn!(place_id = %hit.place_id, "Venue detail unavailable");
        }
        enriched.search = Some(hit);
        enriched
    }

    /// Enrich each event in order, pausing between them.
    pub fn enrich(&self, events: &[FlyerEvent]) -> Vec<EnrichedEvent> {
        info!(count = events.len(), "Enriching events with venue data");

        let mut results = Vec::with_capacity(events.len());
        for (i, event) in events.iter().enumerate() {
            if i > 0 && !self.request_interval.is_zero() {
                thread::sleep(self.request_interval);
            }
            results.push(self.enrich_event(event));
        }
        results
    }
}
