//! End-to-end flyer processing
//!
//! Analyze the flyer, geolocate the requester, fill gaps in the extracted
//! events and enrich each event with venue data.

use scout_cache::{EntryStore, FileEntryStore};
use scout_model::{EnrichedEvent, FlyerEvent, GeoInfo};
use serde::Serialize;
use tracing::info;

use crate::flyer::{FlyerAnalyzer, ImageSource};
use crate::geo::{geolocate, GeoLocator};
use crate::venue::VenueResolver;

/// Result of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub events: Vec<EnrichedEvent>,
    pub geo: Option<GeoInfo>,
}

/// Wires the analyzer, geolocator and venue resolver together.
pub struct FlyerPipeline<'a, S: EntryStore = FileEntryStore> {
    analyzer: FlyerAnalyzer<'a, S>,
    locator: &'a dyn GeoLocator,
    resolver: VenueResolver<'a, S>,
}

impl<'a, S: EntryStore> FlyerPipeline<'a, S> {
    pub fn new(
        analyzer: FlyerAnalyzer<'a, S>,
        locator: &'a dyn GeoLocator,
        resolver: VenueResolver<'a, S>,
    ) -> Self {
        Self {
            analyzer,
            locator,
            resolver,
        }
    }

    /// Process the flyer at `source` on behalf of a requester at `ip`.
    pub fn run(&self, source: &ImageSource, ip: &str) -> PipelineOutput {
        let events = self.analyzer.analyze(source);
        let geo = geolocate(self.locator, ip);
        if events.is_empty() {
            info!(source = %source, "No events extracted from flyer");
            return PipelineOutput {
                events: Vec::new(),
                geo,
            };
        }

        let country = geo.as_ref().map(|g| g.country.as_str());
        let events = fill_missing(events, country);

        PipelineOutput {
            events: self.resolver.enrich(&events),
            geo,
        }
    }
}

/// Use the event name as a stand-in venue and the requester's country as a
/// stand-in location.
pub fn fill_missing(events: Vec<FlyerEvent>, country: Option<&str>) -> Vec<FlyerEvent> {
    let country = country.filter(|c| !c.is_empty());

    events
        .into_iter()
        .map(|mut event| {
            if event.venue.is_none() {
                event.venue = event.event_name.clone();
            }
            if event.location.is_none() {
                event.location = country.map(str::to_string);
            }
            event
        })
        .collect()
}
