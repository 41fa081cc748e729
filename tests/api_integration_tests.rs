//! Integration Tests for API Endpoints
//!
//! Drives the full router with an in-memory backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use stayhub_cache::{
    api::create_router, client::DynBackend, AppState, Backend, Error, ResponseCache, Result,
    SharedCache, WorkerPool,
};
use tower::ServiceExt;

// == Helper Functions ==

/// Answers every search with the same page and counts requests.
struct SearchBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl Backend for SearchBackend {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match path {
            "/public/hotels/search" => Ok(json!({
                "content": [{"id": 1, "name": "Hue Riverside"}],
                "totalElements": 1,
                "query": query.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>(),
            })),
            _ => Err(Error::Backend {
                status: 404,
                message: format!("No route for {path}"),
            }),
        }
    }
}

struct TestApp {
    router: Router,
    cache: SharedCache,
    backend: Arc<SearchBackend>,
}

fn create_test_app() -> TestApp {
    let cache = ResponseCache::shared(Duration::from_secs(300));
    let backend = Arc::new(SearchBackend {
        calls: AtomicUsize::new(0),
    });
    let dyn_backend: DynBackend = backend.clone();
    let state = AppState::new(cache.clone(), Arc::new(WorkerPool::new("test", 2)), dyn_backend);
    TestApp {
        router: create_router(state),
        cache,
        backend,
    }
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

// == Health ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();
    let (status, json) = send(&app.router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

// == Search ==

#[tokio::test]
async fn test_search_is_cached_by_normalized_query() {
    let app = create_test_app();

    let (status, first) = send(&app.router, "GET", "/search/hotels?stars=4,5&query=hue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["totalElements"], 1);
    assert_eq!(first["query"], json!(["query=hue", "stars=4,5"]));

    // Same parameters in another order hit the same entry
    let (status, second) = send(&app.router, "GET", "/search/hotels?query=hue&stars=4,5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(app.backend.calls.load(Ordering::SeqCst), 1);

    assert!(app
        .cache
        .write()
        .await
        .has("search:hotels?query=hue&stars=4,5"));
}

#[tokio::test]
async fn test_search_rejects_malformed_params() {
    let app = create_test_app();
    let (status, _) = send(&app.router, "GET", "/search/hotels?guests=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.backend.calls.load(Ordering::SeqCst), 0);
}

// == Cache administration ==

#[tokio::test]
async fn test_stats_track_hits_and_misses() {
    let app = create_test_app();

    send(&app.router, "GET", "/search/hotels?query=hanoi", None).await;
    send(&app.router, "GET", "/search/hotels?query=hanoi", None).await;

    let (status, stats) = send(&app.router, "GET", "/cache/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["total_entries"], 1);
    assert_eq!(stats["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_delete_key_then_refetch() {
    let app = create_test_app();
    send(&app.router, "GET", "/search/hotels?query=hue", None).await;

    let (status, json) = send(&app.router, "DELETE", "/cache/search:hotels?query=hue", None).await;
    assert_eq!(status, StatusCode::OK);
    // The query string is not part of the path parameter
    assert_eq!(json["removed"], 0);

    let (status, json) = send(&app.router, "DELETE", "/cache/search:hotels%3Fquery=hue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 1);

    send(&app.router, "GET", "/search/hotels?query=hue", None).await;
    assert_eq!(app.backend.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_clear_and_sweep() {
    let app = create_test_app();
    {
        let mut cache = app.cache.write().await;
        cache.set("expired", json!(1), Duration::ZERO);
        cache.set_with_default_ttl("live", json!(2));
        cache.set_with_default_ttl("also-live", json!(3));
    }

    let (status, json) = send(&app.router, "POST", "/cache/sweep", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 1);

    let (status, json) = send(&app.router, "DELETE", "/cache", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 2);
    assert!(app.cache.read().await.is_empty());
}

// == Workers ==

#[tokio::test]
async fn test_filter_task_round_trip() {
    let app = create_test_app();
    let request = json!({
        "taskId": "filter-1",
        "type": "filter",
        "payload": {
            "hotels": [
                {"id": 1, "minPrice": 40},
                {"id": 2, "minPrice": 90},
                {"id": 3, "minPrice": 150}
            ],
            "filters": {"minPrice": 50, "maxPrice": 150}
        }
    });

    let (status, json) = send(&app.router, "POST", "/tasks", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["taskId"], "filter-1");
    assert_eq!(json["result"]["count"], 2);
    assert_eq!(json["result"]["hotels"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["result"]["matchedFields"], json!(["price"]));
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn test_earnings_task() {
    let app = create_test_app();
    let request = json!({
        "taskId": "earn-1",
        "type": "earnings",
        "payload": {
            "bookings": [
                {"hotelId": 1, "hotelName": "Sea Breeze", "status": "COMPLETED", "totalPrice": "120.5", "checkOutDate": "2024-05-02"},
                {"hotelId": 1, "status": "CANCELLED", "totalPrice": 300, "checkOutDate": "2024-05-03"}
            ]
        }
    });

    let (status, json) = send(&app.router, "POST", "/tasks", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"]["totalEarnings"], 120.5);
    assert_eq!(json["result"]["earningsByHotel"]["Sea Breeze"], 120.5);
    assert_eq!(
        json["result"]["earningsByMonth"],
        json!([{"month": "2024-05", "earnings": 120.5}])
    );
}

#[tokio::test]
async fn test_task_without_id_gets_generated_id() {
    let app = create_test_app();
    let request = json!({
        "type": "sort",
        "payload": {"data": [{"n": 2}, {"n": 1}], "sortBy": "n"}
    });

    let (status, json) = send(&app.router, "POST", "/tasks", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!json["taskId"].as_str().unwrap_or_default().is_empty());
    assert_eq!(json["result"], json!([{"n": 1}, {"n": 2}]));
}

#[tokio::test]
async fn test_mismatched_payload_returns_task_error() {
    let app = create_test_app();
    let request = json!({
        "taskId": "filter-2",
        "type": "filter",
        "payload": {"hotels": "none"}
    });

    let (status, json) = send(&app.router, "POST", "/tasks", Some(request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["taskId"], "filter-2");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_workers_status() {
    let app = create_test_app();
    let (status, json) = send(&app.router, "GET", "/workers/status", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalWorkers"], 2);
    assert_eq!(json["availableWorkers"], 2);
    assert_eq!(json["activeTasks"], 0);
    assert_eq!(json["queuedTasks"], 0);
}
