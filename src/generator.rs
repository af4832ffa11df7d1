//! Produces the next plausible metrics snapshot from the previous one via
//! bounded random perturbation. Pure with respect to the random source, so
//! tests can drive it with a seeded rng.

use chrono::Utc;
use rand::Rng;

use crate::models::metrics::{MetricsSnapshot, NewMetricsSnapshot, TimeRange};

pub const BASELINE_ACTIVE_USERS: i64 = 1200;
pub const BASELINE_PAGE_VIEWS: i64 = 30000;
pub const BASELINE_CONVERSION_RATE: f64 = 3.5;
pub const BASELINE_AVG_SESSION_SECONDS: i64 = 260;

pub const MIN_ACTIVE_USERS: i64 = 500;
pub const MIN_PAGE_VIEWS: i64 = 5000;
pub const MIN_CONVERSION_RATE: f64 = 0.5;
pub const MIN_AVG_SESSION_SECONDS: i64 = 60;

/// Next snapshot for `range`. Seeds from the fixed baseline when there is no
/// previous snapshot; otherwise each field gets an independent bounded
/// perturbation, clamped to its floor. Never fails.
pub fn next_snapshot<R: Rng + ?Sized>(
    rng: &mut R,
    previous: Option<&MetricsSnapshot>,
    range: TimeRange,
) -> NewMetricsSnapshot {
    let (active_users, page_views, conversion_rate, avg_session_seconds) = match previous {
        Some(prev) => (
            prev.active_users,
            prev.page_views,
            prev.conversion_rate,
            prev.avg_session_seconds,
        ),
        None => (
            BASELINE_ACTIVE_USERS,
            BASELINE_PAGE_VIEWS,
            BASELINE_CONVERSION_RATE,
            BASELINE_AVG_SESSION_SECONDS,
        ),
    };

    NewMetricsSnapshot {
        created_at: Utc::now(),
        active_users: (active_users + rng.gen_range(-50..=50)).max(MIN_ACTIVE_USERS),
        page_views: (page_views + rng.gen_range(-500..=500)).max(MIN_PAGE_VIEWS),
        conversion_rate: (conversion_rate + rng.gen_range(-0.1..=0.1)).max(MIN_CONVERSION_RATE),
        avg_session_seconds: (avg_session_seconds + rng.gen_range(-10..=10))
            .max(MIN_AVG_SESSION_SECONDS),
        time_range: range,
    }
}
