pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod generator;
pub mod handlers;
pub mod memory_repo;
pub mod models;
pub mod repository;
pub mod scheduler;

use axum::routing::{get, post};
use axum::Router;
use events::ConnectionRegistry;
use repository::AnalyticsRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn AnalyticsRepository>,
    pub registry: ConnectionRegistry,
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/metrics", get(handlers::analytics::get_metrics))
        .route(
            "/api/page-analytics",
            get(handlers::analytics::get_page_analytics),
        )
        .route(
            "/api/device-usage",
            get(handlers::analytics::get_device_usage),
        )
        .route(
            "/api/traffic-data",
            get(handlers::analytics::get_traffic_data),
        )
        .route(
            "/api/demographics-data",
            get(handlers::analytics::get_demographics_data),
        )
        .route(
            "/api/conversion-funnel",
            get(handlers::analytics::get_conversion_funnel),
        )
        .route(
            "/api/performance-data",
            get(handlers::analytics::get_performance_data),
        )
        .route("/api/refresh", post(handlers::refresh::refresh))
        .route("/api/events", get(handlers::events::events))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health_check))
}

/// Build the full application router (used by main and tests).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api_routes())
        .merge(health_routes())
        .with_state(state)
}
