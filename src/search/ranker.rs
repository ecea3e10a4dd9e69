use crate::search::SearchResult;
use std::collections::HashSet;

/// Results returned when the caller gave no time and did not ask for all.
pub const UPCOMING_LIMIT: usize = 3;

/// A matched bus whose departure from the origin is known.
#[derive(Debug, Clone)]
pub struct TimeCandidate {
    pub departure_minutes: i64,
    pub result: SearchResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMode {
    /// Every timed candidate in departure order.
    ShowAll,
    /// Exact departures at the requested minute, else closest first.
    Requested(i64),
    /// Next departures at or after `now`, capped at `UPCOMING_LIMIT`.
    Upcoming(i64),
}

/// Orders timed candidates for `mode` and appends the untimed results after
/// them. Sorts are stable, so equal keys keep collection order.
pub fn rank(
    mut timed: Vec<TimeCandidate>,
    untimed: Vec<SearchResult>,
    mode: RankMode,
) -> Vec<SearchResult> {
    let (chosen, limit) = match mode {
        RankMode::ShowAll => {
            timed.sort_by_key(|c| c.departure_minutes);
            (timed, None)
        }
        RankMode::Requested(requested) => {
            let mut exact: Vec<TimeCandidate> = timed
                .iter()
                .filter(|c| c.departure_minutes == requested)
                .cloned()
                .collect();
            if exact.is_empty() {
                timed.sort_by_key(|c| (c.departure_minutes - requested).abs());
                (timed, None)
            } else {
                exact.sort_by_key(|c| c.departure_minutes);
                (exact, None)
            }
        }
        RankMode::Upcoming(now) => {
            let mut upcoming: Vec<TimeCandidate> = timed
                .iter()
                .filter(|c| c.departure_minutes >= now)
                .cloned()
                .collect();
            if upcoming.is_empty() {
                timed.sort_by_key(|c| (c.departure_minutes - now).abs());
                (timed, Some(UPCOMING_LIMIT))
            } else {
                upcoming.sort_by_key(|c| c.departure_minutes - now);
                (upcoming, Some(UPCOMING_LIMIT))
            }
        }
    };

    let merged = chosen.into_iter().map(|c| c.result).chain(untimed);
    let mut results = dedup_by_bus(merged);
    if let Some(limit) = limit {
        results.truncate(limit);
    }
    results
}

fn dedup_by_bus(results: impl Iterator<Item = SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results
        .filter(|r| seen.insert(r.bus.identity()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bus;
    use crate::search::timing::ResolvedTimings;
    use serde_json::json;

    fn result(id: &str) -> SearchResult {
        let bus: Bus = serde_json::from_value(json!({ "id": id, "type": "KSRTC" })).unwrap();
        let timings = ResolvedTimings::fixed("A", "B");
        SearchResult::new(bus, timings, 15.0, 23, "A", "B", None)
    }

    fn candidate(id: &str, departure_minutes: i64) -> TimeCandidate {
        TimeCandidate {
            departure_minutes,
            result: result(id),
        }
    }

    fn ids(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.bus.id.as_deref().unwrap()).collect()
    }

    #[test]
    fn show_all_sorts_by_departure_then_appends_untimed() {
        let timed = vec![candidate("late", 600), candidate("early", 300), candidate("late", 700)];
        let ranked = rank(timed, vec![result("untimed"), result("early")], RankMode::ShowAll);
        assert_eq!(ids(&ranked), vec!["early", "late", "untimed"]);
    }

    #[test]
    fn exact_requested_time_wins() {
        let timed = vec![candidate("a", 545), candidate("b", 540), candidate("c", 540)];
        let ranked = rank(timed, vec![result("u")], RankMode::Requested(540));
        assert_eq!(ids(&ranked), vec!["b", "c", "u"]);
    }

    #[test]
    fn closest_requested_time_with_stable_ties() {
        let timed = vec![
            candidate("far", 600),
            candidate("before", 535),
            candidate("after", 545),
        ];
        let ranked = rank(timed, Vec::new(), RankMode::Requested(540));
        assert_eq!(ids(&ranked), vec!["before", "after", "far"]);
    }

    #[test]
    fn upcoming_prefers_later_departures_and_caps_results() {
        let timed = vec![
            candidate("gone", 400),
            candidate("d", 700),
            candidate("b", 520),
            candidate("c", 610),
            candidate("a", 500),
        ];
        let ranked = rank(timed, vec![result("u")], RankMode::Upcoming(500));
        assert_eq!(ids(&ranked), vec!["a", "b", "c"]);
    }

    #[test]
    fn upcoming_falls_back_to_nearest_when_all_departed() {
        let timed = vec![candidate("early", 300), candidate("recent", 1300)];
        let ranked = rank(timed, vec![result("u")], RankMode::Upcoming(1400));
        assert_eq!(ids(&ranked), vec!["recent", "early", "u"]);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(rank(Vec::new(), Vec::new(), RankMode::Upcoming(0)).is_empty());
    }
}
