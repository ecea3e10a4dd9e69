mod estimator;
mod geocoder;

pub use estimator::{DistanceEstimate, DistanceEstimator};
pub use geocoder::{Geocoder, NominatimGeocoder};

#[cfg(test)]
pub(crate) use estimator::tests::TableGeocoder;

use crate::models::Coordinates;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

// Great-circle distance between two GPS coordinates (km)
pub fn haversine_distance(a: Coordinates, b: Coordinates) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
