mod admin;
mod buses;
mod favorites;
mod feedback;
pub mod server;

use crate::geo::DistanceEstimator;
use crate::store::Store;
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub estimator: DistanceEstimator,
}

/// Success envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            count: None,
            message: None,
        }
    }

    pub fn created(data: T, message: &'static str) -> Self {
        Self {
            message: Some(message),
            ..Self::data(data)
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn counted(data: Vec<T>) -> Self {
        Self {
            count: Some(data.len()),
            ..Self::data(data)
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: &'static str) -> Self {
        Self {
            success: true,
            data: None,
            count: None,
            message: Some(message),
        }
    }
}

/// Trimmed, non-empty value of an optional request field.
pub(crate) fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    AppState {
        store: Arc::new(Store::in_memory()),
        estimator: DistanceEstimator::new(Arc::new(crate::geo::TableGeocoder::kerala())),
    }
}
