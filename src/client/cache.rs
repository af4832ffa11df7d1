use std::collections::HashMap;

use crate::models::analytics::{
    DemographicBucket, DeviceUsageSnapshot, FunnelStage, PageRecord, PerformancePoint,
    TrafficPoint,
};
use crate::models::metrics::{MetricsSnapshot, TimeRange};

/// Client-side read cache. Metrics are keyed by [`TimeRange`], the same key
/// the polling fetch uses, so a pushed update and a later poll never
/// disagree about which entry is fresh.
#[derive(Debug, Default)]
pub struct DashboardCache {
    selected_range: TimeRange,
    metrics: HashMap<TimeRange, MetricsSnapshot>,
    pages: Option<Vec<PageRecord>>,
    device_usage: Option<DeviceUsageSnapshot>,
    traffic: Option<Vec<TrafficPoint>>,
    demographics: Option<Vec<DemographicBucket>>,
    funnel: Option<Vec<FunnelStage>>,
    performance: Option<Vec<PerformancePoint>>,
}

impl DashboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Range the UI currently displays; pushed updates land here.
    pub fn selected_range(&self) -> TimeRange {
        self.selected_range
    }

    pub fn select_range(&mut self, range: TimeRange) {
        self.selected_range = range;
    }

    pub fn metrics(&self, range: TimeRange) -> Option<&MetricsSnapshot> {
        self.metrics.get(&range)
    }

    /// Store a polled snapshot under its own range.
    pub fn store_metrics(&mut self, snapshot: MetricsSnapshot) {
        self.metrics.insert(snapshot.time_range, snapshot);
    }

    /// Reconcile a pushed snapshot: it overwrites the entry for the
    /// *currently selected* range, whatever range the server generated it
    /// for. The server's periodic task always mutates one fixed default
    /// range, so the pushed value is applied to whatever is on screen. A
    /// deliberate simplification; see DESIGN.md.
    pub fn apply_push(&mut self, snapshot: MetricsSnapshot) {
        self.metrics.insert(self.selected_range, snapshot);
    }

    pub fn pages(&self) -> Option<&[PageRecord]> {
        self.pages.as_deref()
    }

    pub fn set_pages(&mut self, pages: Vec<PageRecord>) {
        self.pages = Some(pages);
    }

    pub fn device_usage(&self) -> Option<&DeviceUsageSnapshot> {
        self.device_usage.as_ref()
    }

    pub fn set_device_usage(&mut self, snapshot: DeviceUsageSnapshot) {
        self.device_usage = Some(snapshot);
    }

    pub fn traffic(&self) -> Option<&[TrafficPoint]> {
        self.traffic.as_deref()
    }

    pub fn set_traffic(&mut self, points: Vec<TrafficPoint>) {
        self.traffic = Some(points);
    }

    pub fn demographics(&self) -> Option<&[DemographicBucket]> {
        self.demographics.as_deref()
    }

    pub fn set_demographics(&mut self, buckets: Vec<DemographicBucket>) {
        self.demographics = Some(buckets);
    }

    pub fn funnel(&self) -> Option<&[FunnelStage]> {
        self.funnel.as_deref()
    }

    pub fn set_funnel(&mut self, stages: Vec<FunnelStage>) {
        self.funnel = Some(stages);
    }

    pub fn performance(&self) -> Option<&[PerformancePoint]> {
        self.performance.as_deref()
    }

    pub fn set_performance(&mut self, points: Vec<PerformancePoint>) {
        self.performance = Some(points);
    }

    /// True once every category has been fetched at least once.
    pub fn is_loaded(&self) -> bool {
        self.metrics.contains_key(&self.selected_range)
            && self.pages.is_some()
            && self.device_usage.is_some()
            && self.traffic.is_some()
            && self.demographics.is_some()
            && self.funnel.is_some()
            && self.performance.is_some()
    }
}
