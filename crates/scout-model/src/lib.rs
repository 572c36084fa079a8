//! Data exchanged with flyer-scout's external collaborators.
//!
//! Field names follow the JSON the collaborators produce so records can be
//! cached and re-read without translation.

mod event;
mod geo;
mod venue;

pub use event::{FlyerAnalysis, FlyerEvent};
pub use geo::GeoInfo;
pub use venue::{EnrichedEvent, TextSearchHit, VenueDetail};
