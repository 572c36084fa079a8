//! IP geolocation

use scout_model::GeoInfo;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::ProducerResult;

/// An ip-api style geolocation service.
pub trait GeoLocator {
    /// Raw JSON response for `ip`.
    fn lookup(&self, ip: &str) -> ProducerResult<Value>;
}

/// Geo info from a response, or `None` unless `status` is `"success"`.
pub fn parse_geo_response(response: &Value) -> Option<GeoInfo> {
    match response.get("status").and_then(Value::as_str) {
        Some("success") => match serde_json::from_value(response.clone()) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!(error = %e, "Malformed geolocation response");
                None
            }
        },
        _ => {
            let message = response
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            warn!(message, "Geolocation lookup unsuccessful");
            None
        }
    }
}

/// Locate `ip`, logging and swallowing failures.
pub fn geolocate(locator: &dyn GeoLocator, ip: &str) -> Option<GeoInfo> {
    let response = match locator.lookup(ip) {
        Ok(response) => response,
        Err(e) => {
            warn!(ip, error = %e, "Geolocation request failed");
            return None;
        }
    };

    let geo = parse_geo_response(&response)?;
    info!(ip, country = %geo.country, city = %geo.city, "Geolocated");
    Some(geo)
}
