use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time window a metrics snapshot is bucketed by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "6h")]
    SixHours,
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl TimeRange {
    pub const ALL: [TimeRange; 5] = [
        TimeRange::Hour,
        TimeRange::SixHours,
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Hour => "1h",
            TimeRange::SixHours => "6h",
            TimeRange::Day => "24h",
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable recorded state of the top-line dashboard metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub active_users: i64,
    pub page_views: i64,
    pub conversion_rate: f64,
    pub avg_session_seconds: i64,
    pub time_range: TimeRange,
}

/// Insert form of [`MetricsSnapshot`]; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewMetricsSnapshot {
    pub created_at: DateTime<Utc>,
    pub active_users: i64,
    pub page_views: i64,
    pub conversion_rate: f64,
    pub avg_session_seconds: i64,
    pub time_range: TimeRange,
}

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    #[serde(default, rename = "timeRange")]
    pub time_range: TimeRange,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RefreshRequest {
    #[serde(default, rename = "timeRange")]
    pub time_range: Option<TimeRange>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub metrics: MetricsSnapshot,
}
