use crate::geo::{haversine_distance, round_to_hundredths, Geocoder};
use crate::search::fare::{index_distance_km, travel_minutes};
use rand::Rng;
use std::sync::Arc;

/// Roads are longer than the straight line between two stops.
const ROAD_DISTANCE_FACTOR: f64 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEstimate {
    pub distance_km: f64,
    pub duration_min: i64,
    /// False when the numbers are a guess and carry no accuracy.
    pub success: bool,
}

impl DistanceEstimate {
    /// Fixed-spacing estimate from route positions, no lookups involved.
    pub fn from_indices(from_index: usize, to_index: usize) -> Self {
        let distance_km = index_distance_km(from_index, to_index);
        Self {
            distance_km,
            duration_min: travel_minutes(distance_km),
            success: true,
        }
    }

    fn guess() -> Self {
        let mut rng = rand::rng();
        Self {
            distance_km: rng.random_range(10.0..60.0),
            duration_min: rng.random_range(30..120),
            success: false,
        }
    }
}

#[derive(Clone)]
pub struct DistanceEstimator {
    geocoder: Arc<dyn Geocoder>,
}

impl DistanceEstimator {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Road distance and travel time between two named places. Both names
    /// are geocoded concurrently; if either lookup misses, the estimate is a
    /// random guess flagged with `success == false`.
    pub async fn estimate(&self, origin: &str, destination: &str) -> DistanceEstimate {
        let (from, to) = futures_util::join!(
            self.geocoder.geocode(origin),
            self.geocoder.geocode(destination)
        );

        let (Some(from), Some(to)) = (from, to) else {
            tracing::warn!(
                "Geocoding failed for {:?} -> {:?}, using fallback estimate",
                origin,
                destination
            );
            return DistanceEstimate::guess();
        };

        let straight = round_to_hundredths(haversine_distance(from, to));
        let distance_km = round_to_hundredths(straight * ROAD_DISTANCE_FACTOR);
        let duration_min = travel_minutes(distance_km);

        tracing::debug!(
            "Distance calculated: {} -> {} = {} km, {} min",
            origin,
            destination,
            distance_km,
            duration_min
        );

        DistanceEstimate {
            distance_km,
            duration_min,
            success: true,
        }
    }
}
