//! End-to-end pipeline tests with in-memory collaborators.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use flyer_scout::{
    FlyerAnalyzer, FlyerPipeline, GeoLocator, ImageSource, PlaceDetails, PlaceSearch, ProducerError,
    ProducerResult, VenueResolver, VenueStore, VisionModel,
};
use scout_cache::{AnalysisCache, CacheConfig, CacheManager, Category, ManualClock, VenueCache};
use scout_model::VenueDetail;
use serde_json::{json, Value};
use tempfile::TempDir;

const REPLY: &str = r#"```json
{
  "is_event_flyer": true,
  "confidence": 0.95,
  "events": [
    {"event_name": "Fabric Live", "date": "08/21/2025", "venue": "Fabric", "location": "London"},
    {"event_name": "Garden Party", "date": "2025-08-22", "venue": null, "location": null}
  ]
}
```"#;

struct CountingModel {
    calls: Cell<usize>,
}

impl VisionModel for CountingModel {
    fn generate(&self, _source: &ImageSource, _prompt: &str) -> ProducerResult<String> {
        self.calls.set(self.calls.get() + 1);
        Ok(REPLY.to_string())
    }
}

struct UkLocator;

impl GeoLocator for UkLocator {
    fn lookup(&self, ip: &str) -> ProducerResult<Value> {
        Ok(json!({"status": "success", "country": "United Kingdom", "countryCode": "GB", "query": ip}))
    }
}

/// Knows only Fabric; everything else has no results.
struct FabricOnlySearch {
    queries: RefCell<Vec<String>>,
}

impl PlaceSearch for FabricOnlySearch {
    fn search_text(&self, query: &str) -> ProducerResult<Value> {
        self.queries.borrow_mut().push(query.to_string());
        if query.starts_with("Fabric") {
            Ok(json!({"places": [{"id": "p-fabric", "displayName": {"text": "Fabric"}}]}))
        } else {
            Ok(json!({"places": []}))
        }
    }
}

struct BrokenDetails;

impl PlaceDetails for BrokenDetails {
    fn fetch_detail(&self, _place_id: &str) -> ProducerResult<Value> {
        Err(ProducerError::Request("detail API unavailable".to_string()))
    }
}

#[derive(Default)]
struct MemoryStore {
    records: RefCell<Vec<VenueDetail>>,
}

impl VenueStore for MemoryStore {
    fn find(&self, place_id: &str) -> ProducerResult<Option<VenueDetail>> {
        Ok(self.records.borrow().iter().find(|d| d.place_id == place_id).cloned())
    }

    fn save(&self, detail: &VenueDetail) -> ProducerResult<()> {
        self.records.borrow_mut().push(detail.clone());
        Ok(())
    }
}

fn fabric_record() -> VenueDetail {
    VenueDetail {
        place_id: "p-fabric".to_string(),
        display_name: Some("Fabric".to_string()),
        country: Some("GB".to_string()),
        locality: Some("London".to_string()),
        ..VenueDetail::default()
    }
}

#[test]
fn test_pipeline_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let cache = CacheManager::open(&CacheConfig::new(temp_dir.path())).unwrap();

    let model = CountingModel { calls: Cell::new(0) };
    let search = FabricOnlySearch { queries: RefCell::new(Vec::new()) };
    let store = MemoryStore::default();
    store.save(&fabric_record()).unwrap();

    let pipeline = FlyerPipeline::new(
        FlyerAnalyzer::new(&model, Some(AnalysisCache::new(&cache))),
        &UkLocator,
        VenueResolver::new(&search, &BrokenDetails, &store, Some(VenueCache::new(&cache)))
            .with_request_interval(Duration::ZERO),
    );

    let output = pipeline.run(&ImageSource::parse("https://example.com/flyer.jpg"), "198.51.100.1");

    assert_eq!(output.geo.as_ref().unwrap().country_code, "GB");
    assert_eq!(output.events.len(), 2);

    let fabric = &output.events[0];
    assert_eq!(fabric.event.date.as_deref(), Some("2025-08-21"));
    assert_eq!(fabric.search.as_ref().unwrap().place_id, "p-fabric");
    assert_eq!(fabric.detail.as_ref().unwrap().locality.as_deref(), Some("London"));

    let garden = &output.events[1];
    assert_eq!(garden.event.venue.as_deref(), Some("Garden Party"));
    assert_eq!(garden.event.location.as_deref(), Some("United Kingdom"));
    assert_eq!(garden.search, None);

    assert_eq!(
        *search.queries.borrow(),
        vec!["Fabric London".to_string(), "Garden Party United Kingdom".to_string()]
    );

    // analysis, Fabric search, Garden Party negative, Fabric detail
    let stats = cache.stats();
    assert_eq!(stats.total_entries, 4);
    assert_eq!(stats.per_category.get("vision_analysis"), Some(&1));
    assert_eq!(stats.per_category.get("places_api"), Some(&2));
    assert_eq!(stats.per_category.get("venue_detail"), Some(&1));
}

#[test]
fn test_second_run_is_served_from_cache() {
    let temp_dir = TempDir::new().unwrap();
    let cache = CacheManager::open(&CacheConfig::new(temp_dir.path())).unwrap();

    let model = CountingModel { calls: Cell::new(0) };
    let search = FabricOnlySearch { queries: RefCell::new(Vec::new()) };
    let store = MemoryStore::default();
    store.save(&fabric_record()).unwrap();

    let pipeline = FlyerPipeline::new(
        FlyerAnalyzer::new(&model, Some(AnalysisCache::new(&cache))),
        &UkLocator,
        VenueResolver::new(&search, &BrokenDetails, &store, Some(VenueCache::new(&cache)))
            .with_request_interval(Duration::ZERO),
    );
    let source = ImageSource::parse("https://example.com/flyer.jpg");

    let first = pipeline.run(&source, "198.51.100.1");
    let second = pipeline.run(&source, "198.51.100.1");

    assert_eq!(first, second);
    assert_eq!(model.calls.get(), 1);
    assert_eq!(search.queries.borrow().len(), 2);
}

#[test]
fn test_negative_search_expires_after_five_minutes() {
    let temp_dir = TempDir::new().unwrap();
    let clock = ManualClock::starting_now();
    let cache = CacheManager::open(&CacheConfig::new(temp_dir.path()))
        .unwrap()
        .with_clock(clock.clone());

    let search = FabricOnlySearch { queries: RefCell::new(Vec::new()) };
    let store = MemoryStore::default();
    let resolver = VenueResolver::new(&search, &BrokenDetails, &store, Some(VenueCache::new(&cache)));

    assert_eq!(resolver.text_search("Nowhere", "Mars"), None);
    clock.advance(Duration::from_secs(299));
    assert_eq!(resolver.text_search("Nowhere", "Mars"), None);
    assert_eq!(search.queries.borrow().len(), 1);

    clock.advance(Duration::from_secs(2));
    assert_eq!(resolver.text_search("Nowhere", "Mars"), None);
    assert_eq!(search.queries.borrow().len(), 2);
    assert!(cache.contains_record("places_search:Nowhere:Mars", &Category::PlacesApi));
}

#[test]
fn test_detail_failure_keeps_search_hit() {
    let search = FabricOnlySearch { queries: RefCell::new(Vec::new()) };
    let store = MemoryStore::default();
    let resolver: VenueResolver = VenueResolver::new(&search, &BrokenDetails, &store, None);

    let hit = resolver.text_search("Fabric", "London").unwrap();
    assert_eq!(resolver.venue_details(&hit.place_id), None);
    assert!(store.records.borrow().is_empty());
}

struct NotAFlyerModel;

impl VisionModel for NotAFlyerModel {
    fn generate(&self, _source: &ImageSource, _prompt: &str) -> ProducerResult<String> {
        Ok(r#"{"is_event_flyer": false, "confidence": 0.2, "events": []}"#.to_string())
    }
}

#[test]
fn test_geo_reported_when_no_events_found() {
    let search = FabricOnlySearch { queries: RefCell::new(Vec::new()) };
    let store = MemoryStore::default();

    let pipeline: FlyerPipeline = FlyerPipeline::new(
        FlyerAnalyzer::new(&NotAFlyerModel, None),
        &UkLocator,
        VenueResolver::new(&search, &BrokenDetails, &store, None),
    );

    let output = pipeline.run(&ImageSource::parse("https://example.com/cat.jpg"), "198.51.100.1");

    assert!(output.events.is_empty());
    assert_eq!(output.geo.unwrap().country, "United Kingdom");
    assert!(search.queries.borrow().is_empty());
}
