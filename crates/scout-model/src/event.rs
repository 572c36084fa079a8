//! Flyer analysis types.

use serde::{Deserialize, Serialize};

/// One event read off a flyer. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlyerEvent {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl FlyerEvent {
    /// True when none of date, name or venue is known.
    pub fn is_blank(&self) -> bool {
        self.date.is_none() && self.event_name.is_none() && self.venue.is_none()
    }
}

/// Structured answer from the vision model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlyerAnalysis {
    #[serde(default)]
    pub is_event_flyer: bool,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub events: Vec<FlyerEvent>,
}
