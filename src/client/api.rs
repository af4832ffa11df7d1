//! Typed request/response client for the dashboard API.

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;

use crate::client::cache::DashboardCache;
use crate::client::ClientError;
use crate::models::analytics::{
    DemographicBucket, DeviceUsageSnapshot, FunnelStage, PageRecord, PerformancePoint,
    TrafficPoint,
};
use crate::models::metrics::{MetricsSnapshot, RefreshRequest, RefreshResponse, TimeRange};

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(response.json().await?)
    }

    pub async fn metrics(&self, range: TimeRange) -> Result<MetricsSnapshot, ClientError> {
        self.get_json(&format!("/api/metrics?timeRange={range}")).await
    }

    pub async fn page_analytics(&self) -> Result<Vec<PageRecord>, ClientError> {
        self.get_json("/api/page-analytics").await
    }

    pub async fn device_usage(&self) -> Result<DeviceUsageSnapshot, ClientError> {
        self.get_json("/api/device-usage").await
    }

    pub async fn traffic_data(&self) -> Result<Vec<TrafficPoint>, ClientError> {
        self.get_json("/api/traffic-data").await
    }

    pub async fn demographics_data(&self) -> Result<Vec<DemographicBucket>, ClientError> {
        self.get_json("/api/demographics-data").await
    }

    pub async fn conversion_funnel(&self) -> Result<Vec<FunnelStage>, ClientError> {
        self.get_json("/api/conversion-funnel").await
    }

    pub async fn performance_data(&self) -> Result<Vec<PerformancePoint>, ClientError> {
        self.get_json("/api/performance-data").await
    }

    /// Trigger an on-demand update cycle. The server also broadcasts the new
    /// snapshot to every open event stream, this client's included.
    pub async fn refresh(
        &self,
        range: Option<TimeRange>,
    ) -> Result<MetricsSnapshot, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/refresh", self.base_url))
            .json(&RefreshRequest { time_range: range })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        let body: RefreshResponse = response.json().await?;
        Ok(body.metrics)
    }

    /// Initial page load: fetch every category and store it in the cache,
    /// keyed the same way pushed updates are reconciled.
    pub async fn prime_cache(
        &self,
        cache: &Arc<Mutex<DashboardCache>>,
    ) -> Result<(), ClientError> {
        let range = cache.lock().expect("cache lock poisoned").selected_range();

        let metrics = self.metrics(range).await?;
        let pages = self.page_analytics().await?;
        let device_usage = self.device_usage().await?;
        let traffic = self.traffic_data().await?;
        let demographics = self.demographics_data().await?;
        let funnel = self.conversion_funnel().await?;
        let performance = self.performance_data().await?;

        let mut cache = cache.lock().expect("cache lock poisoned");
        cache.store_metrics(metrics);
        cache.set_pages(pages);
        cache.set_device_usage(device_usage);
        cache.set_traffic(traffic);
        cache.set_demographics(demographics);
        cache.set_funnel(funnel);
        cache.set_performance(performance);
        Ok(())
    }
}
