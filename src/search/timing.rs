use crate::models::{Bus, BusTiming};
use crate::search::normalize::{loosely_matches, normalize};
use crate::search::time::{minutes_to_time_string, usable_minutes};
use serde::Serialize;

/// Minutes between arrival and departure when times are made up.
const DWELL_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingSource {
    Provided,
    Estimated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTiming {
    pub stop_id: String,
    pub stop_name: String,
    pub arrival_time: String,
    pub departure_time: String,
}

impl ResolvedTiming {
    fn from_stored(timing: &BusTiming, fallback_id: String) -> Option<Self> {
        let arrival = non_blank(&timing.arrival_time);
        let departure = non_blank(&timing.departure_time);
        let (arrival, departure) = match (arrival, departure) {
            (Some(a), Some(d)) => (a, d),
            (Some(t), None) | (None, Some(t)) => (t, t),
            (None, None) => return None,
        };

        Some(Self {
            stop_id: timing.stop_id.clone().unwrap_or(fallback_id),
            stop_name: timing.stop_name.clone(),
            arrival_time: arrival.to_string(),
            departure_time: departure.to_string(),
        })
    }

    fn at(index: usize, stop_name: &str, arrival_time: String, departure_time: String) -> Self {
        Self {
            stop_id: format!("stop_{}", index),
            stop_name: stop_name.to_string(),
            arrival_time,
            departure_time,
        }
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTimings {
    pub from: ResolvedTiming,
    pub to: ResolvedTiming,
    pub source: TimingSource,
}

impl ResolvedTimings {
    /// Departure minute used for ranking. Placeholder times give none.
    pub fn departure_minutes(&self) -> Option<i64> {
        usable_minutes(&self.from.departure_time).or_else(|| usable_minutes(&self.from.arrival_time))
    }

    /// Fixed times shown for buses matched only by their endpoint fields.
    pub fn fixed(from_name: &str, to_name: &str) -> Self {
        Self {
            from: ResolvedTiming::at(0, from_name, "08:00 AM".into(), "08:05 AM".into()),
            to: ResolvedTiming::at(1, to_name, "10:30 AM".into(), "10:35 AM".into()),
            source: TimingSource::Estimated,
        }
    }
}

/// Legacy timings only carry `time`; treat it as both arrival and departure.
pub fn normalize_timings(timings: &[BusTiming]) -> Vec<BusTiming> {
    timings
        .iter()
        .cloned()
        .map(|mut timing| {
            if timing.arrival_time.is_none() && timing.departure_time.is_none() {
                timing.arrival_time = timing.time.clone();
                timing.departure_time = timing.time.clone();
            }
            timing
        })
        .collect()
}

/// Where and when the passenger boards and alights.
#[derive(Debug, Clone)]
pub struct TimingRequest<'a> {
    pub q_from: &'a str,
    pub q_to: &'a str,
    pub from_index: usize,
    pub to_index: usize,
    pub from_name: &'a str,
    pub to_name: &'a str,
    pub requested_minutes: i64,
    pub travel_minutes: i64,
}

/// Uses the bus's stored timings when both requested stops have one,
/// otherwise derives times from the requested minute and the travel time.
pub fn resolve_timings(bus: &Bus, request: &TimingRequest<'_>) -> ResolvedTimings {
    let timings = normalize_timings(&bus.timings);
    let find = |query: &str, index: usize| {
        timings
            .iter()
            .filter(|t| loosely_matches(&normalize(&t.stop_name), query))
            .find_map(|t| ResolvedTiming::from_stored(t, format!("stop_{}", index)))
    };

    if let (Some(from), Some(to)) = (
        find(request.q_from, request.from_index),
        find(request.q_to, request.to_index),
    ) {
        return ResolvedTimings {
            from,
            to,
            source: TimingSource::Provided,
        };
    }

    let depart = request.requested_minutes;
    let arrive = depart + request.travel_minutes;
    ResolvedTimings {
        from: ResolvedTiming::at(
            request.from_index,
            request.from_name,
            minutes_to_time_string(depart + DWELL_MINUTES),
            minutes_to_time_string(depart),
        ),
        to: ResolvedTiming::at(
            request.to_index,
            request.to_name,
            minutes_to_time_string(arrive),
            minutes_to_time_string(arrive + DWELL_MINUTES),
        ),
        source: TimingSource::Estimated,
    }
}
