//! Event cleanup after extraction

use chrono::NaiveDate;
use scout_model::FlyerEvent;

/// Input date formats, tried in order. Month-first wins for ambiguous dates.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Normalize a date to `YYYY-MM-DD`, or return it unchanged if no format matches.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Tidy extracted events:
/// - empty strings and the literal `"null"` become missing
/// - dates are normalized
/// - events with no date, name or venue are dropped
pub fn clean_events(events: Vec<FlyerEvent>) -> Vec<FlyerEvent> {
    events
        .into_iter()
        .map(|event| FlyerEvent {
            date: present(event.date).map(|d| normalize_date(&d)),
            event_name: present(event.event_name),
            venue: present(event.venue),
            location: present(event.location),
        })
        .filter(|event| !event.is_blank())
        .collect()
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "null")
}
