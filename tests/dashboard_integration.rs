use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::StreamExt;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use pulseboard::events::ConnectionRegistry;
use pulseboard::memory_repo::MemoryRepository;
use pulseboard::models::metrics::TimeRange;
use pulseboard::{build_app, AppState};

// -- Helpers ------------------------------------------------------------------

struct TestApp {
    app: axum::Router,
    repo: Arc<MemoryRepository>,
    registry: ConnectionRegistry,
}

async fn setup() -> TestApp {
    let repo = Arc::new(MemoryRepository::with_seed_data().await);
    let registry = ConnectionRegistry::new();
    let state = AppState {
        repo: repo.clone(),
        registry: registry.clone(),
    };
    TestApp {
        app: build_app(state),
        repo,
        registry,
    }
}

async fn json_request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let has_body = body.is_some();
    let body_str = body.map(|b| b.to_string()).unwrap_or_default();
    let mut builder = Request::builder().method(method).uri(uri);

    if has_body {
        builder = builder.header("content-type", "application/json");
    }

    let req = builder.body(Body::from(body_str)).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// -- Read endpoints -----------------------------------------------------------

#[tokio::test]
async fn test_metrics_default_range_returns_seed_snapshot() {
    let t = setup().await;
    let (status, body) = json_request(&t.app, "GET", "/api/metrics", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timeRange"], "24h");
    assert_eq!(body["activeUsers"], 1256);
    assert_eq!(body["pageViews"], 32489);
    assert_eq!(body["conversionRate"], 3.6);
    assert_eq!(body["avgSessionSeconds"], 263);
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn test_metrics_every_range_has_a_latest_snapshot() {
    let t = setup().await;
    for range in TimeRange::ALL {
        let uri = format!("/api/metrics?timeRange={range}");
        let (status, body) = json_request(&t.app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timeRange"], range.as_str());
    }
}

#[tokio::test]
async fn test_metrics_rejects_unknown_range() {
    let t = setup().await;
    let (status, _) = json_request(&t.app, "GET", "/api/metrics?timeRange=2d", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_page_analytics_newest_first_and_read_stable() {
    let t = setup().await;
    let (status, first) = json_request(&t.app, "GET", "/api/page-analytics", None).await;
    assert_eq!(status, StatusCode::OK);

    let rows = first.as_array().unwrap();
    assert_eq!(rows.len(), 5);
    for pair in rows.windows(2) {
        let a = pair[0]["createdAt"].as_str().unwrap();
        let b = pair[1]["createdAt"].as_str().unwrap();
        assert!(a >= b, "expected newest-first ordering");
    }

    // No write in between: identical on repeated calls.
    let (_, second) = json_request(&t.app, "GET", "/api/page-analytics", None).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_device_usage_returns_latest_snapshot() {
    let t = setup().await;
    let (status, body) = json_request(&t.app, "GET", "/api/device-usage", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["desktop"], 45.0);
    assert_eq!(body["mobile"], 40.0);
    assert_eq!(body["tablet"], 15.0);
}

#[tokio::test]
async fn test_series_endpoints_preserve_insertion_order() {
    let t = setup().await;

    let (status, traffic) = json_request(&t.app, "GET", "/api/traffic-data", None).await;
    assert_eq!(status, StatusCode::OK);
    let labels: Vec<&str> = traffic
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["label"].as_str().unwrap())
        .collect();
    assert_eq!(
        labels,
        ["00:00", "03:00", "06:00", "09:00", "12:00", "15:00", "18:00", "21:00"]
    );

    let (_, demographics) = json_request(&t.app, "GET", "/api/demographics-data", None).await;
    let groups: Vec<&str> = demographics
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["ageGroup"].as_str().unwrap())
        .collect();
    assert_eq!(groups, ["18-24", "25-34", "35-44", "45-54", "55-64", "65+"]);

    let (_, funnel) = json_request(&t.app, "GET", "/api/conversion-funnel", None).await;
    let stages: Vec<&str> = funnel
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["stage"].as_str().unwrap())
        .collect();
    assert_eq!(
        stages,
        ["Visitors", "Product Views", "Add to Cart", "Checkout", "Purchase"]
    );

    let (_, performance) = json_request(&t.app, "GET", "/api/performance-data", None).await;
    let days: Vec<&str> = performance
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["day"].as_str().unwrap())
        .collect();
    assert_eq!(days, ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
}

#[tokio::test]
async fn test_health_reports_open_connections() {
    let t = setup().await;
    let (status, body) = json_request(&t.app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 0);

    let (_id, _rx) = t.registry.register();
    let (_, body) = json_request(&t.app, "GET", "/health", None).await;
    assert_eq!(body["connections"], 1);
}

// -- Refresh ------------------------------------------------------------------

#[tokio::test]
async fn test_refresh_adds_exactly_one_snapshot_within_bounds() {
    let t = setup().await;

    let (_, prior) = json_request(&t.app, "GET", "/api/metrics?timeRange=24h", None).await;
    let count_before = t.repo.metrics_count(TimeRange::Day).await;

    let (status, body) = json_request(
        &t.app,
        "POST",
        "/api/refresh",
        Some(json!({ "timeRange": "24h" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    assert_eq!(t.repo.metrics_count(TimeRange::Day).await, count_before + 1);

    let metrics = &body["metrics"];
    assert_eq!(metrics["timeRange"], "24h");
    let active_users = metrics["activeUsers"].as_i64().unwrap();
    let page_views = metrics["pageViews"].as_i64().unwrap();
    let conversion_rate = metrics["conversionRate"].as_f64().unwrap();
    let avg_session = metrics["avgSessionSeconds"].as_i64().unwrap();

    assert!((active_users - prior["activeUsers"].as_i64().unwrap()).abs() <= 50);
    assert!((page_views - prior["pageViews"].as_i64().unwrap()).abs() <= 500);
    assert!((conversion_rate - prior["conversionRate"].as_f64().unwrap()).abs() <= 0.1 + 1e-9);
    assert!((avg_session - prior["avgSessionSeconds"].as_i64().unwrap()).abs() <= 10);

    assert!(active_users >= 500);
    assert!(page_views >= 5000);
    assert!(conversion_rate >= 0.5);
    assert!(avg_session >= 60);

    // The stored latest now matches the returned snapshot.
    let (_, latest) = json_request(&t.app, "GET", "/api/metrics?timeRange=24h", None).await;
    assert_eq!(latest["id"], metrics["id"]);
}

#[tokio::test]
async fn test_refresh_without_body_defaults_to_24h() {
    let t = setup().await;
    let count_before = t.repo.metrics_count(TimeRange::Day).await;

    let (status, body) = json_request(&t.app, "POST", "/api/refresh", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metrics"]["timeRange"], "24h");
    assert_eq!(t.repo.metrics_count(TimeRange::Day).await, count_before + 1);
}

#[tokio::test]
async fn test_refresh_broadcasts_to_open_channels() {
    let t = setup().await;
    let (_id, mut rx) = t.registry.register();

    let (_, body) = json_request(
        &t.app,
        "POST",
        "/api/refresh",
        Some(json!({ "timeRange": "24h" })),
    )
    .await;

    let frame = rx.try_recv().expect("no broadcast received");
    assert_eq!(frame.event, "metrics-update");
    let pushed: Value = serde_json::from_str(&frame.data).unwrap();
    // Pushed frame and HTTP response carry the same snapshot.
    assert_eq!(pushed["id"], body["metrics"]["id"]);
    assert_eq!(pushed["activeUsers"], body["metrics"]["activeUsers"]);
}

// -- Event stream -------------------------------------------------------------

#[tokio::test]
async fn test_events_emits_connected_frame_before_any_update() {
    let t = setup().await;

    let req = Request::builder()
        .method("GET")
        .uri("/api/events")
        .body(Body::empty())
        .unwrap();
    let resp = t.app.clone().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap();
    assert!(content_type
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-cache");
    assert_eq!(t.registry.connection_count(), 1);

    // Queue an update immediately; the acknowledgement must still come first.
    t.registry
        .broadcast("metrics-update", &json!({ "id": 99 }));

    let mut stream = resp.into_body().into_data_stream();
    let mut received = String::new();
    while !received.contains("\n\n") {
        let chunk = stream.next().await.expect("stream ended early").unwrap();
        received.push_str(&String::from_utf8_lossy(&chunk));
    }

    let first_frame = received.split("\n\n").next().unwrap();
    assert!(first_frame.contains("event: connected"));
    assert!(first_frame.contains("data: {\"time\":"));

    while received.matches("\n\n").count() < 2 {
        let chunk = stream.next().await.expect("stream ended early").unwrap();
        received.push_str(&String::from_utf8_lossy(&chunk));
    }
    let second_frame = received.split("\n\n").nth(1).unwrap();
    assert!(second_frame.contains("event: metrics-update"));
    assert!(second_frame.contains("data: {\"id\":99}"));

    // Dropping the response stream disconnects the client and releases the
    // channel.
    drop(stream);
    assert_eq!(t.registry.connection_count(), 0);
}
