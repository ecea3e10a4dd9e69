pub mod fare;
pub mod matcher;
pub mod normalize;
pub mod ranker;
pub mod route;
pub mod time;
pub mod timing;

use crate::geo::{round_to_hundredths, DistanceEstimate, DistanceEstimator};
use crate::models::Bus;
use fare::calculate_fare;
use matcher::{match_endpoints, match_route, FieldMatch, RouteMatch};
use normalize::normalize;
use ranker::{rank, RankMode, TimeCandidate};
use route::extract_route;
use serde::Serialize;
use time::usable_minutes;
use timing::{resolve_timings, ResolvedTiming, ResolvedTimings, TimingRequest, TimingSource};

/// Bus-type filter value that disables filtering.
pub const ALL_TYPES: &str = "all";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub from: String,
    pub to: String,
    pub bus_type: Option<String>,
    pub time: Option<String>,
    pub show_all: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub bus: Bus,
    pub from_timing: ResolvedTiming,
    pub to_timing: ResolvedTiming,
    pub distance: f64,
    pub estimated_time: i64,
    pub fare: i64,
    pub timing_source: TimingSource,
    pub requested_from: String,
    pub requested_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_time: Option<String>,
}

impl SearchResult {
    pub fn new(
        bus: Bus,
        timings: ResolvedTimings,
        distance_km: f64,
        estimated_time: i64,
        requested_from: &str,
        requested_to: &str,
        requested_time: Option<&str>,
    ) -> Self {
        let distance = round_to_hundredths(distance_km);
        let fare = calculate_fare(distance, &bus.bus_type);
        Self {
            bus,
            from_timing: timings.from,
            to_timing: timings.to,
            distance,
            estimated_time,
            fare,
            timing_source: timings.source,
            requested_from: requested_from.to_string(),
            requested_to: requested_to.to_string(),
            requested_time: requested_time.map(str::to_string),
        }
    }
}

/// What one bus contributes to a search.
enum MatchOutcome {
    Ranked(TimeCandidate),
    Unranked(SearchResult),
    Rejected,
}

/// Per-request values shared by every bus evaluation.
struct SearchContext<'a> {
    query: &'a SearchQuery,
    q_from: String,
    q_to: String,
    requested_minutes: i64,
    estimator: &'a DistanceEstimator,
}

impl SearchContext<'_> {
    fn accepts_type(&self, bus: &Bus) -> bool {
        match self.query.bus_type.as_deref().map(str::trim) {
            None | Some("") | Some(ALL_TYPES) => true,
            Some(wanted) => bus.bus_type == wanted,
        }
    }

    async fn evaluate(&self, bus: &Bus) -> MatchOutcome {
        if !self.accepts_type(bus) {
            return MatchOutcome::Rejected;
        }

        let route = extract_route(bus);
        let normalized: Vec<String> = route.iter().map(|stop| normalize(stop)).collect();

        if let Some(route_match) = match_route(&normalized, &self.q_from, &self.q_to) {
            return self.route_outcome(bus, &route, route_match).await;
        }

        if let Some(field_match) = match_endpoints(
            &route,
            bus.from.as_deref(),
            bus.to.as_deref(),
            &self.q_from,
            &self.q_to,
        ) {
            return self.field_outcome(bus, field_match);
        }

        tracing::debug!("Bus {:?} does not serve {} -> {}", bus.bus_name, self.q_from, self.q_to);
        MatchOutcome::Rejected
    }

    async fn route_outcome(&self, bus: &Bus, route: &[String], m: RouteMatch) -> MatchOutcome {
        let from_name = route[m.from_index].as_str();
        let to_name = route[m.to_index].as_str();

        let estimate = if m.from_index == m.to_index {
            DistanceEstimate::from_indices(m.from_index, m.to_index)
        } else {
            self.estimator.estimate(from_name, to_name).await
        };
        if !estimate.success {
            tracing::debug!("Distance for bus {:?} is a rough guess", bus.bus_name);
        }

        let timings = resolve_timings(
            bus,
            &TimingRequest {
                q_from: &self.q_from,
                q_to: &self.q_to,
                from_index: m.from_index,
                to_index: m.to_index,
                from_name,
                to_name,
                requested_minutes: self.requested_minutes,
                travel_minutes: estimate.duration_min,
            },
        );
        let departure = timings.departure_minutes();
        let result = self.result(bus, timings, estimate);

        match departure {
            Some(departure_minutes) => MatchOutcome::Ranked(TimeCandidate {
                departure_minutes,
                result,
            }),
            None => MatchOutcome::Unranked(result),
        }
    }

    fn field_outcome(&self, bus: &Bus, m: FieldMatch) -> MatchOutcome {
        let estimate = DistanceEstimate::from_indices(0, 1);
        let timings = ResolvedTimings::fixed(&m.from, &m.to);
        MatchOutcome::Unranked(self.result(bus, timings, estimate))
    }

    fn result(&self, bus: &Bus, timings: ResolvedTimings, estimate: DistanceEstimate) -> SearchResult {
        SearchResult::new(
            bus.clone(),
            timings,
            estimate.distance_km,
            estimate.duration_min,
            &self.query.from,
            &self.query.to,
            self.query.time.as_deref(),
        )
    }
}

/// Finds the buses serving `query.from` -> `query.to` among `buses` and
/// orders them by departure. `now_minutes` stands in for the requested time
/// when the query has none (or an unusable one).
pub async fn search_buses(
    buses: &[Bus],
    query: &SearchQuery,
    estimator: &DistanceEstimator,
    now_minutes: i64,
) -> Vec<SearchResult> {
    let explicit_minutes = query.time.as_deref().and_then(usable_minutes);
    let ctx = SearchContext {
        query,
        q_from: normalize(&query.from),
        q_to: normalize(&query.to),
        requested_minutes: explicit_minutes.unwrap_or(now_minutes),
        estimator,
    };

    let mut timed = Vec::new();
    let mut untimed = Vec::new();
    for bus in buses {
        match ctx.evaluate(bus).await {
            MatchOutcome::Ranked(candidate) => timed.push(candidate),
            MatchOutcome::Unranked(result) => untimed.push(result),
            MatchOutcome::Rejected => {}
        }
    }

    let mode = match (query.show_all, explicit_minutes) {
        (true, _) => RankMode::ShowAll,
        (false, Some(minutes)) => RankMode::Requested(minutes),
        (false, None) => RankMode::Upcoming(now_minutes),
    };

    tracing::info!(
        "Search {:?} -> {:?}: {} timed, {} untimed candidates, mode {:?}",
        query.from,
        query.to,
        timed.len(),
        untimed.len(),
        mode
    );

    rank(timed, untimed, mode)
}
