use crate::api::{admin, buses, favorites, feedback, AppState};
use crate::error::ApiError;
use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    let bus_routes = Router::new()
        .route("/search", get(buses::search))
        .route("/stops", get(buses::list_stops))
        .route("/stops/nearby", get(buses::nearby_stops));

    let admin_routes = Router::new()
        .route("/buses", get(admin::list_buses).post(admin::create_bus))
        .route("/buses/{id}", put(admin::update_bus).delete(admin::delete_bus))
        .route("/stops", post(admin::create_stop));

    let favorite_routes = Router::new()
        .route("/", get(favorites::list_favorites).post(favorites::add_favorite))
        .route("/{id}", delete(favorites::delete_favorite));

    let feedback_routes = Router::new()
        .route("/", get(feedback::list_feedback).post(feedback::submit_feedback))
        .route("/{id}", put(feedback::update_feedback_status));

    Router::new()
        .nest("/api/buses", bus_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/favorites", favorite_routes)
        .nest("/api/feedback", feedback_routes)
        .route("/health", get(health_check))
        .fallback(not_found)
        .with_state(state)
}

pub fn cors_layer<'a>(origins: impl Iterator<Item = &'a str>) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {:?}", o)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

pub async fn run_server(state: AppState, cors: CorsLayer, port: u16) -> anyhow::Result<()> {
    let app = router(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("CatchMyBus API running on http://localhost:{}", port);
    axum::serve(listener, app).await.context("server error")
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "CatchMyBus API is running" }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ApiError::internal("Internal server error", detail).into_response()
}
