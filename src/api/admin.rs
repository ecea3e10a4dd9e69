use crate::api::{required, ApiResponse, AppState};
use crate::error::ApiError;
use crate::models::{Bus, BusTiming, BusType, Coordinates, RawRoute, Stop};
use crate::store::Document;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static BUS_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^KL-\d{2}-[A-Z]{2}-\d{4}$").expect("valid regex"));

/// Kerala registration format, e.g. KL-07-BC-5678.
pub fn is_valid_bus_number(bus_number: &str) -> bool {
    BUS_NUMBER_RE.is_match(bus_number)
}

fn all_fields_required() -> ApiError {
    ApiError::BadRequest("All fields are required".to_string())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBus {
    pub bus_number: Option<String>,
    pub bus_name: Option<String>,
    #[serde(rename = "type")]
    pub bus_type: Option<String>,
    pub route: Option<RawRoute>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub via: Option<Value>,
    #[serde(default)]
    pub timings: Vec<BusTiming>,
}

fn route_is_empty(route: &RawRoute) -> bool {
    match route {
        RawRoute::Stops(entries) => entries.iter().all(|e| e.stop_name().trim().is_empty()),
        RawRoute::Delimited(text) => text.trim().is_empty(),
        RawRoute::Unrecognized(_) => true,
    }
}

// POST /api/admin/buses
pub async fn create_bus(
    State(state): State<AppState>,
    payload: Result<Json<CreateBus>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Bus>>), ApiError> {
    let Json(body) = payload?;
    tracing::info!("Received bus data: {:?}", body);

    let (Some(bus_number), Some(bus_name), Some(bus_type)) = (
        required(&body.bus_number),
        required(&body.bus_name),
        required(&body.bus_type),
    ) else {
        return Err(all_fields_required());
    };
    let route = match body.route {
        Some(route) if !route_is_empty(&route) => route,
        _ => return Err(all_fields_required()),
    };
    let bus_type: BusType = bus_type.parse().map_err(ApiError::BadRequest)?;

    if !is_valid_bus_number(bus_number) {
        tracing::warn!("Bus number {:?} is not in KL-NN-XX-NNNN format", bus_number);
    }

    let bus = Bus {
        id: None,
        bus_number: bus_number.to_string(),
        bus_name: bus_name.to_string(),
        bus_type: bus_type.to_string(),
        route,
        from: body.from,
        to: body.to,
        via: body.via,
        timings: body.timings,
        created_at: Some(Utc::now()),
        extra: Map::new(),
    };

    let saved = state
        .store
        .insert_bus(bus)
        .await
        .map_err(|e| ApiError::internal("Failed to add bus", e))?;
    tracing::info!("Bus saved with ID: {}", saved.id());

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(saved, "Bus added successfully")),
    ))
}

// GET /api/admin/buses
pub async fn list_buses(State(state): State<AppState>) -> Json<ApiResponse<Vec<Bus>>> {
    Json(ApiResponse::data(state.store.buses().await))
}

// PUT /api/admin/buses/{id}
pub async fn update_bus(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let Json(patch) = payload?;
    let not_found = || ApiError::NotFound(format!("Bus '{}' not found", id));

    let existing = state.store.bus(&id).await.ok_or_else(not_found)?;
    let mut merged = match serde_json::to_value(existing) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => return Err(ApiError::internal("Failed to update bus", other)),
        Err(e) => return Err(ApiError::internal("Failed to update bus", e)),
    };
    merged.extend(patch.into_iter().filter(|(key, _)| key != "id"));

    let updated: Bus = serde_json::from_value(Value::Object(merged))
        .map_err(|e| ApiError::BadRequest(format!("Invalid bus data: {}", e)))?;

    let replaced = state
        .store
        .replace_bus(updated)
        .await
        .map_err(|e| ApiError::internal("Failed to update bus", e))?;
    if !replaced {
        return Err(not_found());
    }

    Ok(Json(ApiResponse::message("Bus updated successfully")))
}

// DELETE /api/admin/buses/{id}
pub async fn delete_bus(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let deleted = state
        .store
        .delete_bus(&id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete bus", e))?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Bus '{}' not found", id)));
    }

    Ok(Json(ApiResponse::message("Bus deleted successfully")))
}

#[derive(Debug, Default, Deserialize)]
pub struct LocationInput {
    pub lat: Option<Value>,
    pub lng: Option<Value>,
}

impl LocationInput {
    fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates {
            lat: coordinate(self.lat.as_ref()?)?,
            lng: coordinate(self.lng.as_ref()?)?,
        })
    }
}

/// Coordinates arrive as numbers or, from form inputs, numeric strings.
fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateStop {
    pub name: Option<String>,
    pub district: Option<String>,
    pub location: Option<LocationInput>,
}

// POST /api/admin/stops
pub async fn create_stop(
    State(state): State<AppState>,
    payload: Result<Json<CreateStop>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Stop>>), ApiError> {
    let Json(body) = payload?;

    let (Some(name), Some(district), Some(location)) =
        (required(&body.name), required(&body.district), body.location.as_ref())
    else {
        return Err(all_fields_required());
    };
    let location = location.coordinates().ok_or_else(|| {
        ApiError::BadRequest("Location must have numeric lat and lng".to_string())
    })?;

    let stop = Stop {
        id: String::new(),
        name: name.to_string(),
        district: district.to_string(),
        location,
        created_at: Some(Utc::now()),
    };

    let saved = state
        .store
        .insert_stop(stop)
        .await
        .map_err(|e| ApiError::internal("Failed to add bus stop", e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(saved, "Bus stop added successfully")),
    ))
}
