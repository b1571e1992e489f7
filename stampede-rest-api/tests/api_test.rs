//! End-to-end tests of the REST router against the in-memory engine

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use stampede_core::{
    BatchDispatcher, DispatchSettings, EngineConnector, EngineError, EngineResult, EngineSession,
    ExecutionRecord, FixedClock, InMemoryEngine, SharedEngineConnector, WorkflowEngine,
};
use stampede_rest_api::{create_rest_app, AppConfig, AppContext, DispatchDefaults};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    engine: Arc<InMemoryEngine>,
}

fn app_with_connector(connector: Arc<dyn EngineConnector>) -> Router {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let dispatcher = BatchDispatcher::new(DispatchSettings {
        shuffle_seed: Some(3),
        ..DispatchSettings::default()
    })
    .with_clock(Arc::new(FixedClock(now)));

    let context = AppContext::new(
        Arc::new(EngineSession::new(connector)),
        Arc::new(dispatcher),
        DispatchDefaults::default(),
    );
    create_rest_app(context, AppConfig::default())
}

fn test_app() -> TestApp {
    let engine = Arc::new(InMemoryEngine::new());
    let connector = SharedEngineConnector::new(engine.clone(), "memory");
    TestApp {
        router: app_with_connector(Arc::new(connector)),
        engine,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn numbers(entries: &Value, field: &str) -> Vec<u64> {
    entries
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry[field].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["engineConnected"], false);
}

#[tokio::test]
async fn start_workflows_priority_batch() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        post_json(
            "/start-workflows",
            json!({"workflowIdPrefix": "Run1", "numberOfWorkflows": 12, "mode": "priority"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "done"}));

    let started = app.engine.started();
    assert_eq!(started.len(), 12);
    assert_eq!(started[0].workflow_id, "Run1-1");
    assert_eq!(started[11].workflow_id, "Run1-12");
}

#[tokio::test]
async fn start_workflows_without_body_uses_defaults() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/start-workflows")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    let started = app.engine.started();
    assert_eq!(started.len(), 100);
    assert_eq!(started[99].workflow_id, "Testing-100");
}

#[tokio::test]
async fn start_workflows_reports_done_despite_item_failures() {
    let app = test_app();
    app.engine.reject_workflow("Run1-2");
    let (status, body) = send(
        &app.router,
        post_json("/start-workflows", json!({"idPrefix": "Run1", "count": 3})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "done");
    assert_eq!(app.engine.started_count(), 2);
}

#[tokio::test]
async fn start_workflows_rejects_malformed_body() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        post_json("/start-workflows", json!({"count": "many"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(body["error"]["status"], 400);
    assert_eq!(app.engine.started_count(), 0);
}

#[tokio::test]
async fn start_workflows_rejects_oversized_batches() {
    let app = test_app();
    let bodies = [
        json!({"idPrefix": "Huge", "count": 1_000_000_000_000_000u64}),
        json!({"idPrefix": "Huge", "count": u64::MAX, "mode": "fairness"}),
        json!({
            "idPrefix": "Huge",
            "mode": "fairness",
            "bands": [
                {"key": "a", "weight": 1, "count": u32::MAX},
                {"key": "b", "weight": 1, "count": u32::MAX}
            ]
        }),
    ];

    for body in bodies {
        let (status, response) = send(&app.router, post_json("/start-workflows", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"]["code"], "BAD_REQUEST");
    }
    assert_eq!(app.engine.started_count(), 0);
}

#[tokio::test]
async fn start_workflows_rejects_blank_band_key() {
    let app = test_app();
    let (status, _) = send(
        &app.router,
        post_json(
            "/start-workflows",
            json!({"mode": "fairness", "count": 2, "bands": [{"key": "", "weight": 5}]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.engine.started_count(), 0);
}

#[tokio::test]
async fn run_status_requires_prefix() {
    let app = test_app();
    for uri in ["/run-status", "/run-status-fairness", "/run-status?runPrefix="] {
        let (status, body) = send(&app.router, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn run_status_priority_histogram() {
    let app = test_app();
    send(
        &app.router,
        post_json("/start-workflows", json!({"idPrefix": "Run1", "count": 10})),
    )
    .await;
    // Run1-1 and Run1-2 form tier 1
    app.engine.set_progress("Run1-1", 3);
    app.engine.set_progress("Run1-2", 5);

    let (status, body) = send(&app.router, get("/run-status?runPrefix=Run1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalWorkflowsInTest"], 10);

    let tiers = body["workflowsByPriority"].as_array().unwrap();
    assert_eq!(tiers.len(), 5);
    assert_eq!(numbers(&body["workflowsByPriority"], "workflowPriority"), vec![1, 2, 3, 4, 5]);
    assert_eq!(tiers[0]["numberOfWorkflows"], 2);
    assert_eq!(numbers(&tiers[0]["activities"], "activityNumber"), vec![1, 2, 3, 4, 5]);
    assert_eq!(numbers(&tiers[0]["activities"], "numberCompleted"), vec![2, 2, 2, 1, 1]);
    assert_eq!(tiers[1]["activities"], json!([]));
}

#[tokio::test]
async fn run_status_fairness_groups_sorted() {
    let app = test_app();
    send(
        &app.router,
        post_json(
            "/start-workflows",
            json!({
                "idPrefix": "Fair",
                "mode": "fairness",
                "bands": [{"key": "b", "weight": 10}, {"key": "a", "weight": 10}, {"key": "c", "weight": 20}],
                "count": 3
            }),
        ),
    )
    .await;
    // Round robin: Fair-1 -> b, Fair-2 -> a, Fair-3 -> c
    app.engine.set_progress("Fair-2", 2);

    let (status, body) = send(&app.router, get("/run-status-fairness?runPrefix=Fair")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalWorkflowsInTest"], 3);

    let groups = body["workflowsByFairness"].as_array().unwrap();
    let order: Vec<(&str, u64)> = groups
        .iter()
        .map(|g| (g["fairnessKey"].as_str().unwrap(), g["fairnessWeight"].as_u64().unwrap()))
        .collect();
    assert_eq!(order, vec![("c", 20), ("a", 10), ("b", 10)]);
    assert_eq!(
        groups[1]["activities"],
        json!([{"activityNumber": 1, "numberCompleted": 1}, {"activityNumber": 2, "numberCompleted": 1}])
    );
    assert_eq!(groups[2]["activities"], json!([]));
}

#[tokio::test]
async fn run_status_keeps_only_prefix_matches() {
    let app = test_app();
    app.engine.insert_record(
        ExecutionRecord::new("Other-1")
            .with_attribute("Priority", json!([1]))
            .with_attribute("ActivitiesCompleted", json!([5])),
    );
    app.engine.insert_record(
        ExecutionRecord::new("Run9-1")
            .with_attribute("Priority", json!([9]))
            .with_attribute("ActivitiesCompleted", json!([5])),
    );

    let (_, body) = send(&app.router, get("/run-status?runPrefix=Run9")).await;
    assert_eq!(body["totalWorkflowsInTest"], 1);
    assert_eq!(
        numbers(&body["workflowsByPriority"], "numberOfWorkflows"),
        vec![0, 0, 0, 0, 0]
    );
}

/// Refuses every connection until told otherwise
struct DownConnector {
    engine: Arc<InMemoryEngine>,
    refusals: AtomicUsize,
}

#[async_trait]
impl EngineConnector for DownConnector {
    async fn connect(&self) -> EngineResult<Arc<dyn WorkflowEngine>> {
        if self.refusals.load(Ordering::SeqCst) > 0 {
            self.refusals.fetch_sub(1, Ordering::SeqCst);
            return Err(EngineError::Network("connection refused".to_string()));
        }
        let engine: Arc<dyn WorkflowEngine> = self.engine.clone();
        Ok(engine)
    }

    fn target(&self) -> String {
        "down".to_string()
    }
}

#[tokio::test]
async fn engine_unavailable_is_503_and_recovers() {
    let engine = Arc::new(InMemoryEngine::new());
    let router = app_with_connector(Arc::new(DownConnector {
        engine: engine.clone(),
        refusals: AtomicUsize::new(2),
    }));

    let (status, body) = send(&router, get("/run-status?runPrefix=Run1")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");

    let (status, _) = send(
        &router,
        post_json("/start-workflows", json!({"idPrefix": "Run1", "count": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(engine.started_count(), 0);

    // The session is retried on the next request
    let (status, _) = send(
        &router,
        post_json("/start-workflows", json!({"idPrefix": "Run1", "count": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(engine.started_count(), 1);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
