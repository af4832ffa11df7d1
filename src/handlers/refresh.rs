use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppError;
use crate::models::metrics::{RefreshRequest, RefreshResponse};
use crate::scheduler;
use crate::AppState;

/// POST /api/refresh — on-demand update cycle. Runs the same generate,
/// store and broadcast path as the periodic scheduler, so connected clients
/// receive an identical `metrics-update` frame, then returns the new
/// snapshot to the caller. The body is optional; `timeRange` defaults to
/// the scheduler's range.
pub async fn refresh(
    State(state): State<AppState>,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let range = body
        .and_then(|Json(req)| req.time_range)
        .unwrap_or(scheduler::SCHEDULED_RANGE);

    tracing::info!(handler = "refresh", time_range = %range, "Handler: POST /api/refresh");

    let metrics = scheduler::run_cycle(&state.repo, &state.registry, range).await?;

    tracing::info!(
        handler = "refresh",
        snapshot_id = metrics.id,
        connections = state.registry.connection_count(),
        status = 200,
        "Responding: refresh complete, update broadcast"
    );

    Ok(Json(RefreshResponse {
        success: true,
        metrics,
    }))
}
