use crate::models::{Bus, RawRoute};
use crate::search::normalize::normalize;
use regex::Regex;
use std::sync::LazyLock;

static ROUTE_DELIMITER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-–→>\s,|]+").expect("valid regex"));

/// Ordered stop names of `bus`, whatever shape its route was stored in.
/// The bus's own `from`/`to` fields are added as first/last stop when the
/// route does not already list them.
pub fn extract_route(bus: &Bus) -> Vec<String> {
    let mut stops: Vec<String> = match &bus.route {
        RawRoute::Stops(entries) => entries
            .iter()
            .map(|entry| entry.stop_name())
            .filter(|name| !name.is_empty())
            .collect(),
        RawRoute::Delimited(text) => ROUTE_DELIMITER_RE
            .split(text)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect(),
        RawRoute::Unrecognized(_) => Vec::new(),
    };

    if let Some(from) = endpoint(&bus.from) {
        if !contains_stop(&stops, from) {
            stops.insert(0, from.to_string());
        }
    }
    if let Some(to) = endpoint(&bus.to) {
        if !contains_stop(&stops, to) {
            stops.push(to.to_string());
        }
    }

    stops
}

fn endpoint(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn contains_stop(stops: &[String], name: &str) -> bool {
    let wanted = normalize(name);
    stops.iter().any(|stop| normalize(stop) == wanted)
}
