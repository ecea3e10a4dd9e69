use crate::models::BusType;

/// Assumed distance between consecutive route stops when no geocoding is done.
pub const MOCK_STOP_DISTANCE_KM: f64 = 15.0;
pub const AVERAGE_SPEED_KMH: f64 = 40.0;
pub const DEFAULT_RATE_PER_KM: f64 = 1.5;

pub fn index_distance_km(from_index: usize, to_index: usize) -> f64 {
    from_index.abs_diff(to_index) as f64 * MOCK_STOP_DISTANCE_KM
}

pub fn travel_minutes(distance_km: f64) -> i64 {
    (distance_km / AVERAGE_SPEED_KMH * 60.0).round() as i64
}

/// Fare in whole rupees. Unknown bus types pay the private-bus rate.
pub fn calculate_fare(distance_km: f64, bus_type: &str) -> i64 {
    let rate = bus_type
        .parse::<BusType>()
        .map(BusType::rate_per_km)
        .unwrap_or(DEFAULT_RATE_PER_KM);
    (distance_km * rate).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_distance_is_symmetric() {
        assert_eq!(index_distance_km(0, 2), 30.0);
        assert_eq!(index_distance_km(3, 1), 30.0);
        assert_eq!(index_distance_km(4, 4), 0.0);
    }

    #[test]
    fn travel_time_at_average_speed() {
        assert_eq!(travel_minutes(15.0), 23);
        assert_eq!(travel_minutes(40.0), 60);
        assert_eq!(travel_minutes(0.0), 0);
    }

    #[test]
    fn fare_rates_by_type() {
        assert_eq!(calculate_fare(100.0, "KSRTC"), 120);
        assert_eq!(calculate_fare(100.0, "Private"), 150);
        assert_eq!(calculate_fare(100.0, "Fast"), 180);
        assert_eq!(calculate_fare(100.0, "Super Fast"), 220);
        assert_eq!(calculate_fare(100.0, "Ordinary"), 100);
        assert_eq!(calculate_fare(100.0, "Luxury"), 150);
    }

    #[test]
    fn fare_never_decreases_with_distance() {
        for bus_type in BusType::ALL {
            let mut last = 0;
            for tenth_km in 0..2000 {
                let fare = calculate_fare(tenth_km as f64 / 10.0, bus_type.as_str());
                assert!(fare >= last);
                last = fare;
            }
        }
    }

    #[test]
    fn defined_types_price_differently() {
        let mut fares: Vec<i64> = BusType::ALL
            .iter()
            .map(|t| calculate_fare(50.0, t.as_str()))
            .collect();
        fares.sort();
        fares.dedup();
        assert_eq!(fares.len(), BusType::ALL.len());
    }
}
