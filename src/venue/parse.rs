//! Places API response parsing

use scout_model::{TextSearchHit, VenueDetail};
use serde_json::Value;

/// Best hit of a text search response, or `None` when `places` is empty.
pub fn parse_text_search(response: &Value) -> Option<TextSearchHit> {
    let place = response.get("places")?.as_array()?.first()?;
    let place_id = place.get("id")?.as_str()?.to_string();

    Some(TextSearchHit {
        place_id,
        display_name: text_field(place, "displayName"),
    })
}

/// Venue record from a place detail response.
///
/// Country, prefecture/state and city come from the `shortText` of the
/// matching `addressComponents`; later duplicates overwrite earlier ones.
pub fn parse_detail_response(place_id: &str, response: &Value) -> VenueDetail {
    let mut detail = VenueDetail {
        place_id: place_id.to_string(),
        display_name: text_field(response, "displayName"),
        formatted_address: str_field(response, "formattedAddress"),
        business_status: str_field(response, "businessStatus"),
        types: response
            .get("types")
            .and_then(Value::as_array)
            .map(|types| types.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default(),
        latitude: response.pointer("/location/latitude").and_then(Value::as_f64),
        longitude: response.pointer("/location/longitude").and_then(Value::as_f64),
        ..VenueDetail::default()
    };

    let components = response
        .get("addressComponents")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for component in components {
        let has_type = |wanted: &str| {
            component
                .get("types")
                .and_then(Value::as_array)
                .is_some_and(|types| types.iter().any(|t| t.as_str() == Some(wanted)))
        };
        let short_text = str_field(component, "shortText");

        if has_type("country") {
            detail.country = short_text;
        } else if has_type("administrative_area_level_1") {
            detail.administrative_area_level_1 = short_text;
        } else if has_type("locality") {
            detail.locality = short_text;
        }
    }

    detail
}

fn str_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

fn text_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(|inner| inner.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_search_takes_first_place() {
        let response = json!({
            "places": [
                {"id": "ChIJ-fabric", "displayName": {"text": "Fabric", "languageCode": "en"}},
                {"id": "ChIJ-other", "displayName": {"text": "Other"}}
            ]
        });

        let hit = parse_text_search(&response).unwrap();
        assert_eq!(hit.place_id, "ChIJ-fabric");
        assert_eq!(hit.display_name.as_deref(), Some("Fabric"));
    }

    #[test]
    fn test_text_search_without_results() {
        assert_eq!(parse_text_search(&json!({})), None);
        assert_eq!(parse_text_search(&json!({"places": []})), None);
    }

    #[test]
    fn test_detail_response() {
        let response = json!({
            "displayName": {"text": "Fabric"},
            "formattedAddress": "77A Charterhouse St, London EC1M 6HJ, UK",
            "businessStatus": "OPERATIONAL",
            "types": ["night_club", "point_of_interest"],
            "location": {"latitude": 51.5196, "longitude": -0.1025},
            "addressComponents": [
                {"shortText": "77A", "types": ["street_number"]},
                {"shortText": "London", "types": ["locality", "political"]},
                {"shortText": "England", "types": ["administrative_area_level_1", "political"]},
                {"shortText": "GB", "types": ["country", "political"]}
            ]
        });

        let detail = parse_detail_response("ChIJ-fabric", &response);
        assert_eq!(detail.place_id, "ChIJ-fabric");
        assert_eq!(detail.display_name.as_deref(), Some("Fabric"));
        assert_eq!(detail.business_status.as_deref(), Some("OPERATIONAL"));
        assert_eq!(detail.types, vec!["night_club", "point_of_interest"]);
        assert_eq!(detail.latitude, Some(51.5196));
        assert_eq!(detail.country.as_deref(), Some("GB"));
        assert_eq!(detail.administrative_area_level_1.as_deref(), Some("England"));
        assert_eq!(detail.locality.as_deref(), Some("London"));
    }

    #[test]
    fn test_sparse_detail_response() {
        let detail = parse_detail_response("p1", &json!({}));
        assert_eq!(detail.place_id, "p1");
        assert!(detail.types.is_empty());
        assert_eq!(detail.country, None);
        assert_eq!(detail.longitude, None);
    }
}
