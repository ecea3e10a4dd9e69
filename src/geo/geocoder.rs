use crate::models::Coordinates;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Resolves a free-text place name to a single best-guess coordinate.
/// Implementations never fail outward; a miss of any kind is `None`.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, place: &str) -> Option<Coordinates>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// OpenStreetMap Nominatim search, scoped to a fixed region.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    url: String,
    region: String,
}

impl NominatimGeocoder {
    pub fn new(
        url: impl Into<String>,
        region: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        // Nominatim refuses requests that do not identify the application.
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            region: region.into(),
        })
    }

    fn query_for(&self, place: &str) -> String {
        if self.region.is_empty() {
            place.to_string()
        } else {
            format!("{}, {}", place, self.region)
        }
    }

    async fn lookup(&self, place: &str) -> reqwest::Result<Vec<NominatimPlace>> {
        let query = self.query_for(place);
        self.client
            .get(&self.url)
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, place: &str) -> Option<Coordinates> {
        let places = match self.lookup(place).await {
            Ok(places) => places,
            Err(e) => {
                tracing::error!("Geocoding error for {:?}: {}", place, e);
                return None;
            }
        };

        let coords = places.first().and_then(|p| {
            Some(Coordinates {
                lat: p.lat.parse().ok()?,
                lng: p.lon.parse().ok()?,
            })
        });

        if coords.is_none() {
            tracing::warn!("Geocoding failed for: {}", place);
        }
        coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_region_to_query() {
        let geocoder = NominatimGeocoder::new(
            "http://localhost/search",
            "Kerala, India",
            "CatchMyBus/1.0",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(geocoder.query_for("Pala"), "Pala, Kerala, India");

        let unscoped =
            NominatimGeocoder::new("http://localhost/search", "", "CatchMyBus/1.0", Duration::from_secs(1))
                .unwrap();
        assert_eq!(unscoped.query_for("Pala"), "Pala");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_miss() {
        let geocoder = NominatimGeocoder::new(
            "http://127.0.0.1:9/search",
            "Kerala, India",
            "CatchMyBus/1.0",
            Duration::from_millis(500),
        )
        .unwrap();
        assert_eq!(geocoder.geocode("Pala").await, None);
    }

    #[test]
    fn parses_nominatim_payload() {
        let places: Vec<NominatimPlace> =
            serde_json::from_str(r#"[{"lat":"9.7136","lon":"76.6836","display_name":"Pala"}]"#)
                .unwrap();
        assert_eq!(places[0].lat, "9.7136");
        assert_eq!(places[0].lon, "76.6836");
    }
}
