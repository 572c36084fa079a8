//! Venue lookup types.

use serde::{Deserialize, Serialize};

use crate::event::FlyerEvent;

/// Best match from a places text search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSearchHit {
    #[serde(rename = "textsearch_place_id")]
    pub place_id: String,
    #[serde(rename = "textsearch_display_name", default)]
    pub display_name: Option<String>,
}

/// Venue record, from the persistent store or the detail API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueDetail {
    #[serde(rename = "detailapi_place_id")]
    pub place_id: String,
    #[serde(rename = "detailapi_display_name", default)]
    pub display_name: Option<String>,
    #[serde(rename = "detailapi_formatted_address", default)]
    pub formatted_address: Option<String>,
    #[serde(rename = "detailapi_business_status", default)]
    pub business_status: Option<String>,
    #[serde(rename = "detailapi_types", default)]
    pub types: Vec<String>,
    #[serde(rename = "detailapi_latitude", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "detailapi_longitude", default)]
    pub longitude: Option<f64>,
    #[serde(rename = "detailapi_country", default)]
    pub country: Option<String>,
    #[serde(rename = "detailapi_administrative_area_level_1", default)]
    pub administrative_area_level_1: Option<String>,
    #[serde(rename = "detailapi_locality", default)]
    pub locality: Option<String>,
}

/// A flyer event with whatever venue data could be found for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEvent {
    #[serde(flatten)]
    pub event: FlyerEvent,
    #[serde(flatten)]
    pub search: Option<TextSearchHit>,
    #[serde(flatten)]
    pub detail: Option<VenueDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detail_uses_prefixed_field_names() {
        let detail = VenueDetail {
            place_id: "p1".to_string(),
            country: Some("JP".to_string()),
            types: vec!["night_club".to_string()],
            ..VenueDetail::default()
        };

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["detailapi_place_id"], json!("p1"));
        assert_eq!(value["detailapi_country"], json!("JP"));
        assert_eq!(value["detailapi_types"], json!(["night_club"]));
    }

    #[test]
    fn test_enriched_event_is_flat() {
        let enriched = EnrichedEvent {
            event: FlyerEvent {
                venue: Some("WOMB".to_string()),
                ..FlyerEvent::default()
            },
            search: Some(TextSearchHit {
                place_id: "p1".to_string(),
                display_name: Some("WOMB".to_string()),
            }),
            detail: None,
        };

        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(value["venue"], json!("WOMB"));
        assert_eq!(value["textsearch_place_id"], json!("p1"));
        assert!(value.get("detailapi_place_id").is_none());
    }
}
