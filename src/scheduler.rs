//! Periodic metrics mutation. A single background task generates a new
//! snapshot for the default range on a fixed interval, stores it and
//! broadcasts it. The explicit `/api/refresh` endpoint runs the same cycle,
//! so pushed frames look identical either way.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::events::{ConnectionRegistry, METRICS_UPDATE_EVENT};
use crate::generator;
use crate::models::metrics::{MetricsSnapshot, TimeRange};
use crate::repository::AnalyticsRepository;

/// Range the periodic task always mutates. Clients reconcile pushed
/// snapshots onto whatever range they currently display; see
/// [`crate::client::DashboardCache::apply_push`].
pub const SCHEDULED_RANGE: TimeRange = TimeRange::Day;

/// One update cycle: read the latest snapshot for `range`, perturb it,
/// store the result and broadcast it under [`METRICS_UPDATE_EVENT`].
pub async fn run_cycle(
    repo: &Arc<dyn AnalyticsRepository>,
    registry: &ConnectionRegistry,
    range: TimeRange,
) -> Result<MetricsSnapshot, AppError> {
    let previous = repo.latest_metrics(range).await?;
    let next = generator::next_snapshot(&mut rand::thread_rng(), previous.as_ref(), range);
    let snapshot = repo.insert_metrics(next).await?;

    registry.broadcast(METRICS_UPDATE_EVENT, &snapshot);

    tracing::debug!(
        range = %range,
        snapshot_id = snapshot.id,
        active_users = snapshot.active_users,
        "Update cycle complete"
    );
    Ok(snapshot)
}

/// Handle to the armed periodic timer. Dropping the handle does not stop the
/// task; call [`UpdateScheduler::shutdown`] at process teardown so no tick
/// fires after the server is gone.
pub struct UpdateScheduler {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl UpdateScheduler {
    pub fn start(
        repo: Arc<dyn AnalyticsRepository>,
        registry: ConnectionRegistry,
        period: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(update_loop(repo, registry, period, cancel.clone()));
        tracing::info!(period_secs = period.as_secs_f64(), "Update scheduler armed");
        Self { cancel, task }
    }

    /// Cancel the pending timer. Safe to call more than once.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn update_loop(
    repo: Arc<dyn AnalyticsRepository>,
    registry: ConnectionRegistry,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick of a tokio interval completes immediately; consume it
    // so the first broadcast lands one full period after start.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Update scheduler stopped");
                return;
            }
            _ = interval.tick() => {
                // A failed cycle is logged and skipped; the timer re-arms.
                if let Err(e) = run_cycle(&repo, &registry, SCHEDULED_RANGE).await {
                    tracing::error!(error = %e, "Scheduled update cycle failed");
                }
            }
        }
    }
}
