use crate::api::{required, ApiResponse, AppState};
use crate::error::ApiError;
use crate::geo::haversine_distance;
use crate::models::{Coordinates, Stop};
use crate::search::time::kerala_now_minutes;
use crate::search::{search_buses, SearchQuery, SearchResult};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;
const NEARBY_LIMIT: usize = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(rename = "type")]
    pub bus_type: Option<String>,
    pub time: Option<String>,
    pub show_all: Option<String>,
}

impl SearchParams {
    fn into_query(self) -> Result<SearchQuery, ApiError> {
        let (Some(from), Some(to)) = (required(&self.from), required(&self.to)) else {
            return Err(ApiError::BadRequest(
                "From and to parameters are required".to_string(),
            ));
        };

        Ok(SearchQuery {
            from: from.to_string(),
            to: to.to_string(),
            bus_type: self.bus_type.clone(),
            time: required(&self.time).map(str::to_string),
            show_all: self.show_all.as_deref() == Some("true"),
        })
    }
}

// GET /api/buses/search
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<SearchResult>>>, ApiError> {
    let Query(params) = params?;
    let query = params.into_query()?;

    let buses = state.store.buses().await;
    let results = search_buses(&buses, &query, &state.estimator, kerala_now_minutes()).await;

    Ok(Json(ApiResponse::counted(results)))
}

// GET /api/buses/stops
pub async fn list_stops(State(state): State<AppState>) -> Json<ApiResponse<Vec<Stop>>> {
    Json(ApiResponse::data(state.store.stops().await))
}

#[derive(Debug, Default, Deserialize)]
pub struct NearbyParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
}

// GET /api/buses/stops/nearby
pub async fn nearby_stops(
    State(state): State<AppState>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Stop>>>, ApiError> {
    let Query(params) = params?;
    let parse = |field: &Option<String>| required(field).and_then(|v| v.parse::<f64>().ok());

    let (Some(lat), Some(lng)) = (parse(&params.lat), parse(&params.lng)) else {
        return Err(ApiError::BadRequest(
            "Latitude and longitude are required".to_string(),
        ));
    };
    let radius = parse(&params.radius).unwrap_or(DEFAULT_NEARBY_RADIUS_KM);
    let origin = Coordinates { lat, lng };

    let mut nearby: Vec<(f64, Stop)> = state
        .store
        .stops()
        .await
        .into_iter()
        .map(|stop| (haversine_distance(origin, stop.location), stop))
        .filter(|(distance, _)| *distance <= radius)
        .collect();
    nearby.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(Json(ApiResponse::data(
        nearby
            .into_iter()
            .take(NEARBY_LIMIT)
            .map(|(_, stop)| stop)
            .collect(),
    )))
}
