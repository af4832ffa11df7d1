use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::analytics::{
    DemographicBucket, DeviceUsageSnapshot, FunnelStage, NewDemographicBucket,
    NewDeviceUsageSnapshot, NewFunnelStage, NewPageRecord, NewPerformancePoint, NewTrafficPoint,
    PageRecord, PerformancePoint, TrafficPoint,
};
use crate::models::metrics::{MetricsSnapshot, NewMetricsSnapshot, TimeRange};
use crate::repository::AnalyticsRepository;

/// In-memory analytics store. All collections are append-only; ids are
/// assigned from per-category monotonic counters.
pub struct MemoryRepository {
    inner: RwLock<Store>,
}

#[derive(Default)]
struct Store {
    metrics: Vec<MetricsSnapshot>,
    pages: Vec<PageRecord>,
    device_usage: Vec<DeviceUsageSnapshot>,
    traffic: Vec<TrafficPoint>,
    demographics: Vec<DemographicBucket>,
    funnel: Vec<FunnelStage>,
    performance: Vec<PerformancePoint>,
    next_id: NextId,
}

#[derive(Default)]
struct NextId {
    metrics: i64,
    pages: i64,
    device_usage: i64,
    traffic: i64,
    demographics: i64,
    funnel: i64,
    performance: i64,
}

impl NextId {
    fn bump(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Store::default()),
        }
    }

    /// Store pre-populated with the fixed sample data set: one metrics
    /// snapshot per time range, five page records, one device-usage
    /// snapshot, and the traffic, demographics, funnel and performance
    /// series the dashboard charts expect.
    pub async fn with_seed_data() -> Self {
        let repo = Self::new();
        repo.seed().await;
        repo
    }

    async fn seed(&self) {
        let now = Utc::now();

        {
            let mut store = self.inner.write().await;

            for range in TimeRange::ALL {
                let id = NextId::bump(&mut store.next_id.metrics);
                store.metrics.push(MetricsSnapshot {
                    id,
                    created_at: now,
                    active_users: 1256,
                    page_views: 32489,
                    conversion_rate: 3.6,
                    avg_session_seconds: 263,
                    time_range: range,
                });
            }

            let pages: [(&str, i64, i64, f64, i64); 5] = [
                ("/home", 12543, 8721, 32.4, 133),
                ("/products", 8427, 6382, 28.7, 222),
                ("/blog", 5372, 4128, 41.2, 257),
                ("/checkout", 3241, 2986, 12.8, 174),
                ("/about", 2879, 2124, 52.3, 92),
            ];
            for (path, views, unique_views, bounce_rate, avg_time_seconds) in pages {
                let id = NextId::bump(&mut store.next_id.pages);
                store.pages.push(PageRecord {
                    id,
                    path: path.to_string(),
                    views,
                    unique_views,
                    bounce_rate,
                    avg_time_seconds,
                    created_at: now,
                });
            }

            let id = NextId::bump(&mut store.next_id.device_usage);
            store.device_usage.push(DeviceUsageSnapshot {
                id,
                desktop: 45.0,
                mobile: 40.0,
                tablet: 15.0,
                created_at: now,
            });

            let labels = [
                "00:00", "03:00", "06:00", "09:00", "12:00", "15:00", "18:00", "21:00",
            ];
            let current = [120, 190, 300, 510, 620, 780, 880, 730];
            let previous = [90, 150, 260, 420, 560, 680, 750, 650];
            for i in 0..labels.len() {
                let id = NextId::bump(&mut store.next_id.traffic);
                store.traffic.push(TrafficPoint {
                    id,
                    label: labels[i].to_string(),
                    current: current[i],
                    previous: previous[i],
                    created_at: now,
                });
            }

            let age_groups = ["18-24", "25-34", "35-44", "45-54", "55-64", "65+"];
            let male = [15, 30, 25, 18, 12, 8];
            let female = [18, 34, 27, 15, 10, 6];
            for i in 0..age_groups.len() {
                let id = NextId::bump(&mut store.next_id.demographics);
                store.demographics.push(DemographicBucket {
                    id,
                    age_group: age_groups[i].to_string(),
                    male: male[i],
                    female: female[i],
                    created_at: now,
                });
            }

            let stages = [
                ("Visitors", 10000),
                ("Product Views", 8200),
                ("Add to Cart", 4300),
                ("Checkout", 2100),
                ("Purchase", 1200),
            ];
            for (stage, value) in stages {
                let id = NextId::bump(&mut store.next_id.funnel);
                store.funnel.push(FunnelStage {
                    id,
                    stage: stage.to_string(),
                    value,
                    created_at: now,
                });
            }

            let days = [
                ("Mon", 320),
                ("Tue", 380),
                ("Wed", 275),
                ("Thu", 290),
                ("Fri", 310),
                ("Sat", 260),
                ("Sun", 295),
            ];
            for (day, load_time_ms) in days {
                let id = NextId::bump(&mut store.next_id.performance);
                store.performance.push(PerformancePoint {
                    id,
                    day: day.to_string(),
                    load_time_ms,
                    created_at: now,
                });
            }
        }

        tracing::info!("Seed data loaded");
    }

    /// Number of stored snapshots for a range (diagnostics and tests).
    pub async fn metrics_count(&self, range: TimeRange) -> usize {
        let store = self.inner.read().await;
        store
            .metrics
            .iter()
            .filter(|m| m.time_range == range)
            .count()
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalyticsRepository for MemoryRepository {
    async fn latest_metrics(
        &self,
        range: TimeRange,
    ) -> Result<Option<MetricsSnapshot>, AppError> {
        let store = self.inner.read().await;
        let latest = store
            .metrics
            .iter()
            .filter(|m| m.time_range == range)
            .max_by_key(|m| (m.created_at, m.id))
            .cloned();
        tracing::debug!(range = %range, found = latest.is_some(), "store: latest metrics");
        Ok(latest)
    }

    async fn insert_metrics(
        &self,
        new: NewMetricsSnapshot,
    ) -> Result<MetricsSnapshot, AppError> {
        let mut store = self.inner.write().await;
        let id = NextId::bump(&mut store.next_id.metrics);
        let snapshot = MetricsSnapshot {
            id,
            created_at: new.created_at,
            active_users: new.active_users,
            page_views: new.page_views,
            conversion_rate: new.conversion_rate,
            avg_session_seconds: new.avg_session_seconds,
            time_range: new.time_range,
        };
        store.metrics.push(snapshot.clone());
        tracing::debug!(id, range = %snapshot.time_range, "store: metrics snapshot inserted");
        Ok(snapshot)
    }

    async fn all_page_analytics(&self) -> Result<Vec<PageRecord>, AppError> {
        let store = self.inner.read().await;
        let mut rows = store.pages.clone();
        // Newest first; id as tie-break so repeated reads are stable.
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn insert_page_record(&self, new: NewPageRecord) -> Result<PageRecord, AppError> {
        let mut store = self.inner.write().await;
        let id = NextId::bump(&mut store.next_id.pages);
        let record = PageRecord {
            id,
            path: new.path,
            views: new.views,
            unique_views: new.unique_views,
            bounce_rate: new.bounce_rate,
            avg_time_seconds: new.avg_time_seconds,
            created_at: new.created_at,
        };
        store.pages.push(record.clone());
        Ok(record)
    }

    async fn latest_device_usage(&self) -> Result<Option<DeviceUsageSnapshot>, AppError> {
        let store = self.inner.read().await;
        Ok(store
            .device_usage
            .iter()
            .max_by_key(|d| (d.created_at, d.id))
            .cloned())
    }

    async fn insert_device_usage(
        &self,
        new: NewDeviceUsageSnapshot,
    ) -> Result<DeviceUsageSnapshot, AppError> {
        let mut store = self.inner.write().await;
        let id = NextId::bump(&mut store.next_id.device_usage);
        let snapshot = DeviceUsageSnapshot {
            id,
            desktop: new.desktop,
            mobile: new.mobile,
            tablet: new.tablet,
            created_at: new.created_at,
        };
        store.device_usage.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn all_traffic_points(&self) -> Result<Vec<TrafficPoint>, AppError> {
        let store = self.inner.read().await;
        let mut rows = store.traffic.clone();
        rows.sort_by_key(|p| p.id);
        Ok(rows)
    }

    async fn insert_traffic_point(
        &self,
        new: NewTrafficPoint,
    ) -> Result<TrafficPoint, AppError> {
        let mut store = self.inner.write().await;
        let id = NextId::bump(&mut store.next_id.traffic);
        let point = TrafficPoint {
            id,
            label: new.label,
            current: new.current,
            previous: new.previous,
            created_at: new.created_at,
        };
        store.traffic.push(point.clone());
        Ok(point)
    }

    async fn all_demographic_buckets(&self) -> Result<Vec<DemographicBucket>, AppError> {
        let store = self.inner.read().await;
        let mut rows = store.demographics.clone();
        rows.sort_by_key(|b| b.id);
        Ok(rows)
    }

    async fn insert_demographic_bucket(
        &self,
        new: NewDemographicBucket,
    ) -> Result<DemographicBucket, AppError> {
        let mut store = self.inner.write().await;
        let id = NextId::bump(&mut store.next_id.demographics);
        let bucket = DemographicBucket {
            id,
            age_group: new.age_group,
            male: new.male,
            female: new.female,
            created_at: new.created_at,
        };
        store.demographics.push(bucket.clone());
        Ok(bucket)
    }

    async fn all_funnel_stages(&self) -> Result<Vec<FunnelStage>, AppError> {
        let store = self.inner.read().await;
        let mut rows = store.funnel.clone();
        rows.sort_by_key(|s| s.id);
        Ok(rows)
    }

    async fn insert_funnel_stage(&self, new: NewFunnelStage) -> Result<FunnelStage, AppError> {
        let mut store = self.inner.write().await;
        let id = NextId::bump(&mut store.next_id.funnel);
        let stage = FunnelStage {
            id,
            stage: new.stage,
            value: new.value,
            created_at: new.created_at,
        };
        store.funnel.push(stage.clone());
        Ok(stage)
    }

    async fn all_performance_points(&self) -> Result<Vec<PerformancePoint>, AppError> {
        let store = self.inner.read().await;
        let mut rows = store.performance.clone();
        rows.sort_by_key(|p| p.id);
        Ok(rows)
    }

    async fn insert_performance_point(
        &self,
        new: NewPerformancePoint,
    ) -> Result<PerformancePoint, AppError> {
        let mut store = self.inner.write().await;
        let id = NextId::bump(&mut store.next_id.performance);
        let point = PerformancePoint {
            id,
            day: new.day,
            load_time_ms: new.load_time_ms,
            created_at: new.created_at,
        };
        store.performance.push(point.clone());
        Ok(point)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn seed_populates_every_category() {
        let repo = MemoryRepository::with_seed_data().await;

        for range in TimeRange::ALL {
            let latest = repo.latest_metrics(range).await.unwrap().unwrap();
            assert_eq!(latest.active_users, 1256);
            assert_eq!(latest.time_range, range);
        }
        assert_eq!(repo.all_page_analytics().await.unwrap().len(), 5);
        assert!(repo.latest_device_usage().await.unwrap().is_some());
        assert_eq!(repo.all_traffic_points().await.unwrap().len(), 8);
        assert_eq!(repo.all_demographic_buckets().await.unwrap().len(), 6);
        assert_eq!(repo.all_funnel_stages().await.unwrap().len(), 5);
        assert_eq!(repo.all_performance_points().await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn latest_metrics_picks_max_created_at_not_insert_order() {
        let repo = MemoryRepository::new();
        let now = Utc::now();

        // Inserted later but timestamped earlier: must not win.
        repo.insert_metrics(NewMetricsSnapshot {
            created_at: now,
            active_users: 1000,
            page_views: 20000,
            conversion_rate: 3.0,
            avg_session_seconds: 200,
            time_range: TimeRange::Day,
        })
        .await
        .unwrap();
        repo.insert_metrics(NewMetricsSnapshot {
            created_at: now - Duration::seconds(10),
            active_users: 999,
            page_views: 19999,
            conversion_rate: 2.9,
            avg_session_seconds: 199,
            time_range: TimeRange::Day,
        })
        .await
        .unwrap();

        let latest = repo.latest_metrics(TimeRange::Day).await.unwrap().unwrap();
        assert_eq!(latest.active_users, 1000);
    }

    #[tokio::test]
    async fn latest_metrics_is_scoped_to_the_requested_range() {
        let repo = MemoryRepository::with_seed_data().await;
        let later = Utc::now() + Duration::seconds(5);

        repo.insert_metrics(NewMetricsSnapshot {
            created_at: later,
            active_users: 2000,
            page_views: 40000,
            conversion_rate: 4.0,
            avg_session_seconds: 300,
            time_range: TimeRange::Week,
        })
        .await
        .unwrap();

        let week = repo.latest_metrics(TimeRange::Week).await.unwrap().unwrap();
        assert_eq!(week.active_users, 2000);
        let day = repo.latest_metrics(TimeRange::Day).await.unwrap().unwrap();
        assert_eq!(day.active_users, 1256);
    }

    #[tokio::test]
    async fn page_analytics_sorted_newest_first_and_stable() {
        let repo = MemoryRepository::with_seed_data().await;

        let first = repo.all_page_analytics().await.unwrap();
        let second = repo.all_page_analytics().await.unwrap();
        assert_eq!(first.len(), 5);
        for pair in first.windows(2) {
            assert!((pair[0].created_at, pair[0].id) >= (pair[1].created_at, pair[1].id));
        }
        let ids: Vec<i64> = first.iter().map(|p| p.id).collect();
        let ids_again: Vec<i64> = second.iter().map(|p| p.id).collect();
        assert_eq!(ids, ids_again);
    }

    #[tokio::test]
    async fn insertion_order_categories_keep_their_order() {
        let repo = MemoryRepository::with_seed_data().await;

        let labels: Vec<String> = repo
            .all_traffic_points()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.label)
            .collect();
        assert_eq!(labels[0], "00:00");
        assert_eq!(labels[7], "21:00");

        let stages: Vec<String> = repo
            .all_funnel_stages()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.stage)
            .collect();
        assert_eq!(
            stages,
            ["Visitors", "Product Views", "Add to Cart", "Checkout", "Purchase"]
        );
    }
}
