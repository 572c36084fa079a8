//! flyer-scout - event extraction from flyer images
//!
//! Reads events off a flyer with a vision model, then resolves each venue
//! through a places API and a persistent venue store. Every expensive call is
//! memoized in the file-backed cache from `scout-cache`.

pub mod config;
pub mod error;
pub mod flyer;
pub mod geo;
pub mod pipeline;
pub mod venue;

pub use config::{ConfigError, ScoutConfig, VenueConfig};
pub use error::{ProducerError, ProducerResult};
pub use flyer::{FlyerAnalyzer, ImageSource, VisionModel};
pub use geo::{geolocate, GeoLocator};
pub use pipeline::{FlyerPipeline, PipelineOutput};
pub use venue::{PlaceDetails, PlaceSearch, VenueResolver, VenueStore};
