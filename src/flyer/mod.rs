//! Flyer analysis
//!
//! Sends a flyer image to a vision model, parses the structured reply and
//! caches successful analyses per image fingerprint.

mod clean;
mod parse;

pub use clean::{clean_events, normalize_date};
pub use parse::{extract_json_block, fallback_extraction, parse_analysis};

use std::fmt;
use std::path::PathBuf;

use scout_cache::{AnalysisCache, EntryStore, FileEntryStore};
use scout_model::{FlyerAnalysis, FlyerEvent};
use tracing::{debug, info, warn};

use crate::error::ProducerResult;

/// Instruction sent with every flyer image.
pub const EXTRACTION_PROMPT: &str = r#"Analyze this event flyer image and extract information about ALL events shown.

For EACH individual event, identify:
1. Event name/title
2. Date (in YYYY-MM-DD format)
3. Venue name
4. Location (city, address, or area)

Important instructions:
- If multiple events are shown, create separate entries for each event
- Match each event name with its corresponding date, venue, and location
- If an event spans multiple dates, create separate entries for each date
- If information is missing for an event, use null for that field
- Be precise about which information belongs to which event
- Look for DJ names, artist names, party names as event names
- Look for club names, venue names, hall names, building names as venues

Respond in this JSON format:
{
    "is_event_flyer": true/false,
    "confidence": 0.0-1.0,
    "events": [
        {
            "event_name": "Event Name 1",
            "date": "2024-01-01",
            "venue": "Venue Name 1",
            "location": "Location 1"
        }
    ]
}

If it's not an event flyer, set is_event_flyer to false and events to an empty array."#;

/// Where a flyer image lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Url(String),
}

impl ImageSource {
    /// `http://` and `https://` references are URLs, anything else a path.
    pub fn parse(reference: &str) -> Self {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            Self::Url(reference.to_string())
        } else {
            Self::Path(PathBuf::from(reference))
        }
    }

    /// The reference as given, used as the cache fingerprint base.
    pub fn reference(&self) -> String {
        match self {
            Self::Path(path) => path.to_string_lossy().to_string(),
            Self::Url(url) => url.clone(),
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference())
    }
}

/// A vision-language model client.
pub trait VisionModel {
    /// Run `prompt` against the image and return the raw text reply.
    fn generate(&self, source: &ImageSource, prompt: &str) -> ProducerResult<String>;
}

/// Extracts events from flyers, consulting the analysis cache first.
pub struct FlyerAnalyzer<'a, S: EntryStore = FileEntryStore> {
    model: &'a dyn VisionModel,
    cache: Option<AnalysisCache<'a, S>>,
}

impl<'a, S: EntryStore> FlyerAnalyzer<'a, S> {
    pub fn new(model: &'a dyn VisionModel, cache: Option<AnalysisCache<'a, S>>) -> Self {
        Self { model, cache }
    }

    /// Events on the flyer, cleaned. Empty when the image is not a flyer or
    /// the model fails.
    pub fn analyze(&self, source: &ImageSource) -> Vec<FlyerEvent> {
        let reference = source.reference();

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get_analysis::<FlyerAnalysis>(&reference) {
                info!(source = %reference, "Using cached flyer analysis");
                return clean_events(cached.events);
            }
        }

        let reply = match self.model.generate(source, EXTRACTION_PROMPT) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(source = %reference, error = %e, "Vision analysis failed");
                return Vec::new();
            }
        };

        let analysis = match parse_analysis(&reply) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(source = %reference, error = %e, "Model reply is not valid JSON, trying fallback extraction");
                return fallback_extraction(&reply);
            }
        };

        debug!(
            is_event_flyer = analysis.is_event_flyer,
            confidence = ?analysis.confidence,
            "Parsed flyer analysis"
        );

        if !analysis.is_event_flyer {
            info!(source = %reference, "Image is not an event flyer");
            return Vec::new();
        }
        if analysis.events.is_empty() {
            info!(source = %reference, "No events found on flyer");
            return Vec::new();
        }

        let events = clean_events(analysis.events.clone());
        if let Some(cache) = &self.cache {
            cache.set_analysis(&reference, &analysis, None);
        }

        info!(source = %reference, count = events.len(), "Extracted events");
        events
    }
}
