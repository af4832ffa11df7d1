use async_trait::async_trait;

use crate::error::AppError;
use crate::models::analytics::{
    DemographicBucket, DeviceUsageSnapshot, FunnelStage, NewDemographicBucket,
    NewDeviceUsageSnapshot, NewFunnelStage, NewPageRecord, NewPerformancePoint, NewTrafficPoint,
    PageRecord, PerformancePoint, TrafficPoint,
};
use crate::models::metrics::{MetricsSnapshot, NewMetricsSnapshot, TimeRange};

/// Storage capability set for the dashboard: get-latest, list-all and insert
/// per category. Records are immutable once created and never deleted, so the
/// live-update core stays independent of the storage choice — a database
/// backend can replace [`crate::memory_repo::MemoryRepository`] without
/// touching the scheduler, registry or handlers.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Latest snapshot for a range: max `created_at`, id as tie-break.
    /// Write order across interleaved refresh calls is not assumed.
    async fn latest_metrics(&self, range: TimeRange)
        -> Result<Option<MetricsSnapshot>, AppError>;
    async fn insert_metrics(&self, new: NewMetricsSnapshot)
        -> Result<MetricsSnapshot, AppError>;

    /// All page records, newest first.
    async fn all_page_analytics(&self) -> Result<Vec<PageRecord>, AppError>;
    async fn insert_page_record(&self, new: NewPageRecord) -> Result<PageRecord, AppError>;

    async fn latest_device_usage(&self) -> Result<Option<DeviceUsageSnapshot>, AppError>;
    async fn insert_device_usage(
        &self,
        new: NewDeviceUsageSnapshot,
    ) -> Result<DeviceUsageSnapshot, AppError>;

    /// Traffic points in insertion order.
    async fn all_traffic_points(&self) -> Result<Vec<TrafficPoint>, AppError>;
    async fn insert_traffic_point(&self, new: NewTrafficPoint)
        -> Result<TrafficPoint, AppError>;

    /// Demographic buckets in insertion order.
    async fn all_demographic_buckets(&self) -> Result<Vec<DemographicBucket>, AppError>;
    async fn insert_demographic_bucket(
        &self,
        new: NewDemographicBucket,
    ) -> Result<DemographicBucket, AppError>;

    /// Funnel stages in insertion order.
    async fn all_funnel_stages(&self) -> Result<Vec<FunnelStage>, AppError>;
    async fn insert_funnel_stage(&self, new: NewFunnelStage) -> Result<FunnelStage, AppError>;

    /// Performance points in insertion order.
    async fn all_performance_points(&self) -> Result<Vec<PerformancePoint>, AppError>;
    async fn insert_performance_point(
        &self,
        new: NewPerformancePoint,
    ) -> Result<PerformancePoint, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}
