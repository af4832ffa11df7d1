//! Read endpoints: each returns the stored snapshots for one category.
//! These only fail when seed data is absent, which is an internal invariant
//! violation reported as a 500, never a user error.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppError;
use crate::models::metrics::MetricsQuery;
use crate::AppState;

/// GET /api/metrics?timeRange=24h
pub async fn get_metrics(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "get_metrics",
        time_range = %query.time_range,
        "Handler: GET /api/metrics"
    );

    let snapshot = state
        .repo
        .latest_metrics(query.time_range)
        .await?
        .ok_or(AppError::SeedMissing { category: "metrics" })?;

    tracing::debug!(
        handler = "get_metrics",
        snapshot_id = snapshot.id,
        "Responding with latest snapshot"
    );
    Ok(Json(snapshot))
}

/// GET /api/page-analytics
pub async fn get_page_analytics(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(handler = "get_page_analytics", "Handler: GET /api/page-analytics");
    let records = state.repo.all_page_analytics().await?;
    tracing::debug!(handler = "get_page_analytics", count = records.len(), "Repo returned");
    Ok(Json(records))
}

/// GET /api/device-usage
pub async fn get_device_usage(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(handler = "get_device_usage", "Handler: GET /api/device-usage");
    let snapshot = state
        .repo
        .latest_device_usage()
        .await?
        .ok_or(AppError::SeedMissing { category: "device usage" })?;
    Ok(Json(snapshot))
}

/// GET /api/traffic-data
pub async fn get_traffic_data(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(handler = "get_traffic_data", "Handler: GET /api/traffic-data");
    let points = state.repo.all_traffic_points().await?;
    Ok(Json(points))
}

/// GET /api/demographics-data
pub async fn get_demographics_data(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(handler = "get_demographics_data", "Handler: GET /api/demographics-data");
    let buckets = state.repo.all_demographic_buckets().await?;
    Ok(Json(buckets))
}

/// GET /api/conversion-funnel
pub async fn get_conversion_funnel(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(handler = "get_conversion_funnel", "Handler: GET /api/conversion-funnel");
    let stages = state.repo.all_funnel_stages().await?;
    Ok(Json(stages))
}

/// GET /api/performance-data
pub async fn get_performance_data(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(handler = "get_performance_data", "Handler: GET /api/performance-data");
    let points = state.repo.all_performance_points().await?;
    Ok(Json(points))
}
