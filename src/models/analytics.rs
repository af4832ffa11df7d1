//! Per-category analytics records. All are immutable once created; the store
//! assigns ids from the `New*` insert forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate statistics for a single page path. Retrieval is newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub id: i64,
    pub path: String,
    pub views: i64,
    pub unique_views: i64,
    pub bounce_rate: f64,
    pub avg_time_seconds: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPageRecord {
    pub path: String,
    pub views: i64,
    pub unique_views: i64,
    pub bounce_rate: f64,
    pub avg_time_seconds: i64,
    pub created_at: DateTime<Utc>,
}

/// Share of sessions per device class, in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUsageSnapshot {
    pub id: i64,
    pub desktop: f64,
    pub mobile: f64,
    pub tablet: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDeviceUsageSnapshot {
    pub desktop: f64,
    pub mobile: f64,
    pub tablet: f64,
    pub created_at: DateTime<Utc>,
}

/// One point on the traffic chart, current period vs previous period.
/// Insertion order is the display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficPoint {
    pub id: i64,
    pub label: String,
    pub current: i64,
    pub previous: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTrafficPoint {
    pub label: String,
    pub current: i64,
    pub previous: i64,
    pub created_at: DateTime<Utc>,
}

/// Visitor counts by age group and gender.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicBucket {
    pub id: i64,
    pub age_group: String,
    pub male: i64,
    pub female: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDemographicBucket {
    pub age_group: String,
    pub male: i64,
    pub female: i64,
    pub created_at: DateTime<Utc>,
}

/// One stage of the conversion funnel. Insertion order is funnel order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStage {
    pub id: i64,
    pub stage: String,
    pub value: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFunnelStage {
    pub stage: String,
    pub value: i64,
    pub created_at: DateTime<Utc>,
}

/// Page load time for one day of the week, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePoint {
    pub id: i64,
    pub day: String,
    pub load_time_ms: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPerformancePoint {
    pub day: String,
    pub load_time_ms: i64,
    pub created_at: DateTime<Utc>,
}
