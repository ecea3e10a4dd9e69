use crate::search::normalize::{loosely_matches, normalize};

/// Positions of the requested stops within a bus route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch {
    pub from_index: usize,
    pub to_index: usize,
}

/// Endpoint stops used when a route-order match is not possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    pub from: String,
    pub to: String,
}

fn first_index(normalized_route: &[String], query: &str) -> Option<usize> {
    normalized_route
        .iter()
        .position(|stop| loosely_matches(stop, query))
}

/// Finds `from` and `to` in route order. Queries naming the same stop twice
/// resolve both ends to its first occurrence; otherwise `from` must not come
/// after `to`, since a bus is never assumed to run its route in reverse.
pub fn match_route(normalized_route: &[String], q_from: &str, q_to: &str) -> Option<RouteMatch> {
    let from_index = first_index(normalized_route, q_from)?;
    if q_from == q_to {
        return Some(RouteMatch {
            from_index,
            to_index: from_index,
        });
    }

    let to_index = first_index(normalized_route, q_to)?;
    (from_index <= to_index).then_some(RouteMatch {
        from_index,
        to_index,
    })
}

/// Endpoint-only match: the first/last route stops when the route has at
/// least two, otherwise the bus's raw `from`/`to` fields.
pub fn match_endpoints(
    route: &[String],
    bus_from: Option<&str>,
    bus_to: Option<&str>,
    q_from: &str,
    q_to: &str,
) -> Option<FieldMatch> {
    let (from, to) = match route {
        [first, .., last] => (first.clone(), last.clone()),
        _ => (
            bus_from.unwrap_or_default().to_string(),
            bus_to.unwrap_or_default().to_string(),
        ),
    };

    if q_from.is_empty() || q_to.is_empty() {
        return None;
    }

    let norm_from = normalize(&from);
    let norm_to = normalize(&to);
    let matched = if q_from == q_to {
        norm_from.contains(q_from) || norm_to.contains(q_from)
    } else {
        norm_from.contains(q_from) && norm_to.contains(q_to)
    };

    matched.then_some(FieldMatch { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(stops: &[&str]) -> Vec<String> {
        stops.iter().map(|s| normalize(s)).collect()
    }

    #[test]
    fn matches_forward_direction() {
        let r = route(&["Pala", "Kottayam", "Ernakulam"]);
        assert_eq!(
            match_route(&r, "pala", "ernakulam"),
            Some(RouteMatch { from_index: 0, to_index: 2 })
        );
    }

    #[test]
    fn rejects_reverse_direction() {
        let r = route(&["A", "B", "C"]);
        assert_eq!(match_route(&r, "c", "a"), None);
    }

    #[test]
    fn same_stop_resolves_to_first_occurrence() {
        let r = route(&["Kochi", "Aluva", "Kochi"]);
        let m = match_route(&r, "kochi", "kochi").unwrap();
        assert_eq!(m.from_index, 0);
        assert_eq!(m.to_index, 0);
    }

    #[test]
    fn tolerates_abbreviation_and_over_specification() {
        let r = route(&["Kochi KSRTC Bus Stand", "Thrissur"]);
        assert!(match_route(&r, "kochi", "thrissur ksrtc").is_some());
    }

    #[test]
    fn ignores_case_and_punctuation() {
        let r = route(&["Pala.", "ERNAKULAM"]);
        assert!(match_route(&r, &normalize("PALA"), &normalize("ernakulam!")).is_some());
    }

    #[test]
    fn missing_stop_is_no_match() {
        let r = route(&["Pala", "Kottayam"]);
        assert_eq!(match_route(&r, "pala", "kollam"), None);
        assert_eq!(match_route(&[], "pala", "kottayam"), None);
    }

    #[test]
    fn endpoint_match_uses_first_and_last_stops() {
        let r: Vec<String> = ["Pala", "Kottayam", "Ernakulam"].map(String::from).to_vec();
        assert_eq!(
            match_endpoints(&r, None, None, "pala", "ernakulam"),
            Some(FieldMatch { from: "Pala".into(), to: "Ernakulam".into() })
        );
        assert_eq!(match_endpoints(&r, None, None, "ernakulam", "pala"), None);
    }

    #[test]
    fn endpoint_match_falls_back_to_bus_fields() {
        let r = vec!["Pala".to_string()];
        assert!(match_endpoints(&r, Some("Pala Town"), Some("Vyttila Hub"), "pala", "vyttila").is_some());
        assert!(match_endpoints(&r, Some("Pala Town"), None, "pala", "pala").is_some());
        assert!(match_endpoints(&r, None, None, "pala", "vyttila").is_none());
    }
}
