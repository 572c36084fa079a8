//! Vision model response parsing
//!
//! The model is asked for a JSON document but often wraps it in a Markdown
//! fence. When the payload still does not parse, a regex pass recovers
//! parallel `event_names` / `dates` / `venues` / `locations` lists.

use regex_lite::Regex;
use scout_model::{FlyerAnalysis, FlyerEvent};

/// Pull the JSON document out of a model reply.
///
/// Handles ```` ```json ```` fences, bare ```` ``` ```` fences and raw text.
pub fn extract_json_block(text: &str) -> &str {
    if let Some(open) = text.find("```json") {
        let start = open + "```json".len();
        let end = text[start..].find("```").map(|i| start + i).unwrap_or(text.len());
        return text[start..end].trim();
    }

    if let Some(open) = text.find("```") {
        let start = open + "```".len();
        let end = match text.rfind("```") {
            Some(close) if close >= start => close,
            _ => text.len(),
        };
        return text[start..end].trim();
    }

    text.trim()
}

/// Parse a model reply into a [`FlyerAnalysis`].
pub fn parse_analysis(text: &str) -> serde_json::Result<FlyerAnalysis> {
    serde_json::from_str(extract_json_block(text))
}

/// Recover events from a reply whose JSON is broken.
///
/// Needs at least an event-name list and a date list; venues and locations
/// are optional. Lists are aligned by position.
pub fn fallback_extraction(text: &str) -> Vec<FlyerEvent> {
    let names = list_field(text, "event_names?");
    let dates = list_field(text, "dates?");

    let (Some(names), Some(dates)) = (names, dates) else {
        return Vec::new();
    };
    let venues = list_field(text, "venues?").unwrap_or_default();
    let locations = list_field(text, "locations?").unwrap_or_default();

    let len = names.len().max(dates.len());
    (0..len)
        .map(|i| FlyerEvent {
            date: dates.get(i).cloned().flatten(),
            event_name: names.get(i).cloned().flatten(),
            venue: venues.get(i).cloned().flatten(),
            location: locations.get(i).cloned().flatten(),
        })
        .collect()
}

/// First `"<field>": [ ... ]` list in `text`, split on commas.
fn list_field(text: &str, field: &str) -> Option<Vec<Option<String>>> {
    let pattern = format!(r#"(?i)"{}":\s*\[(.*?)\]"#, field);
    let re = Regex::new(&pattern).ok()?;
    let body = re.captures(text)?.get(1)?.as_str();

    Some(
        body.split(',')
            .map(|item| {
                let item = item.trim().trim_matches('"').trim();
                (!item.is_empty()).then(|| item.to_string())
            })
            .collect(),
    )
}
