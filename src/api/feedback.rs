use crate::api::{required, ApiResponse, AppState};
use crate::error::ApiError;
use crate::models::{Feedback, FeedbackStatus, FeedbackType, DEFAULT_USER_ID};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Parses a lowercase enum value such as "timing" or "resolved".
fn parse_variant<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T, ApiError> {
    serde_json::from_value(Value::String(raw.to_string()))
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} '{}'", what, raw)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedback {
    pub bus_id: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub feedback_type: Option<String>,
    pub user_id: Option<String>,
}

// POST /api/feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    payload: Result<Json<CreateFeedback>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Feedback>>), ApiError> {
    let Json(body) = payload?;
    let (Some(bus_id), Some(message), Some(feedback_type)) = (
        required(&body.bus_id),
        required(&body.message),
        required(&body.feedback_type),
    ) else {
        return Err(ApiError::BadRequest("All fields are required".to_string()));
    };
    let feedback_type: FeedbackType = parse_variant(feedback_type, "feedback type")?;

    let feedback = Feedback {
        id: String::new(),
        user_id: Some(required(&body.user_id).unwrap_or(DEFAULT_USER_ID).to_string()),
        bus_id: bus_id.to_string(),
        message: message.to_string(),
        feedback_type,
        status: FeedbackStatus::Pending,
        created_at: Utc::now(),
    };

    let saved = state
        .store
        .insert_feedback(feedback)
        .await
        .map_err(|e| ApiError::internal("Failed to submit feedback", e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(saved, "Feedback submitted successfully")),
    ))
}

// GET /api/feedback
pub async fn list_feedback(State(state): State<AppState>) -> Json<ApiResponse<Vec<Feedback>>> {
    Json(ApiResponse::data(state.store.feedback().await))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFeedback {
    pub status: Option<String>,
}

// PUT /api/feedback/{id}
pub async fn update_feedback_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateFeedback>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let Json(body) = payload?;
    let status = required(&body.status)
        .ok_or_else(|| ApiError::BadRequest("Status is required".to_string()))?;
    let status: FeedbackStatus = parse_variant(status, "feedback status")?;

    let updated = state
        .store
        .set_feedback_status(&id, status)
        .await
        .map_err(|e| ApiError::internal("Failed to update feedback", e))?;
    if !updated {
        return Err(ApiError::NotFound(format!("Feedback '{}' not found", id)));
    }

    Ok(Json(ApiResponse::message("Feedback status updated successfully")))
}
