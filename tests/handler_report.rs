mod common;

use axum::Router;
use axum_test::TestServer;
use link_analytics::api::routes::report_routes;
use link_analytics::state::AppState;
use serde_json::json;
use std::future::IntoFuture;
use tempfile::TempDir;

fn server(state: AppState) -> TestServer {
    let app = Router::new().merge(report_routes()).with_state(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_build_report_by_source_ip() {
    let dir = TempDir::new().unwrap();
    let state = common::create_test_state(dir.path()).await;
    common::seed_clicks(&state.event_store).await;
    let server = server(state);

    let response = server
        .post("/report")
        .json(&json!({ "dimensions": ["SourceIP"] }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "1.2.3.4": { "sum": 2 },
        "5.6.7.8": { "sum": 1 }
    }));
}

#[tokio::test]
async fn test_build_nested_report() {
    let dir = TempDir::new().unwrap();
    let state = common::create_test_state(dir.path()).await;
    common::seed_clicks(&state.event_store).await;
    let server = server(state);

    let response = server
        .post("/report")
        .json(&json!({ "Dimensions": ["Destination", "TimeInterval"] }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "http://a.com (abc123)": {
            "sum": 3,
            "groups": {
                "10:30": { "sum": 2 },
                "10:31": { "sum": 1 }
            }
        }
    }));
}

#[tokio::test]
async fn test_build_report_with_only_unknown_dimensions_is_empty() {
    let dir = TempDir::new().unwrap();
    let state = common::create_test_state(dir.path()).await;
    common::seed_clicks(&state.event_store).await;
    let server = server(state);

    let response = server
        .post("/report")
        .json(&json!({ "dimensions": ["Country"] }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({}));
}

#[tokio::test]
async fn test_build_report_rejects_bad_dimension_count() {
    let dir = TempDir::new().unwrap();
    let state = common::create_test_state(dir.path()).await;
    let server = server(state);

    let response = server
        .post("/report")
        .json(&json!({ "dimensions": [] }))
        .await;

    response.assert_status_bad_request();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");

    let response = server
        .post("/report")
        .json(&json!({
            "dimensions": ["SourceIP", "TimeInterval", "Destination", "SourceIP"]
        }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_build_report_rejects_malformed_json() {
    let dir = TempDir::new().unwrap();
    let state = common::create_test_state(dir.path()).await;
    let server = server(state);

    let response = server
        .post("/report")
        .content_type("application/json")
        .text("{not json")
        .await;

    response.assert_status_bad_request();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["message"], "Invalid JSON payload");
}

#[tokio::test]
async fn test_last_report_not_found_before_any_build() {
    let dir = TempDir::new().unwrap();
    let state = common::create_test_state(dir.path()).await;
    let server = server(state);

    let response = server.get("/report").await;

    response.assert_status_not_found();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_last_report_returns_build_without_rebuilding() {
    let dir = TempDir::new().unwrap();
    let state = common::create_test_state(dir.path()).await;
    common::seed_clicks(&state.event_store).await;
    let store = state.event_store.clone();
    let server = server(state);

    server
        .post("/report")
        .json(&json!({ "dimensions": ["SourceIP"] }))
        .await
        .assert_status_ok();

    // Clicks after the build are not reflected until the next build.
    store
        .record_click("http://a.com", "5.6.7.8", "2024-01-01 11:00")
        .await
        .unwrap();

    let response = server.get("/report").await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "1.2.3.4": { "sum": 2 },
        "5.6.7.8": { "sum": 1 }
    }));

    let stored: serde_json::Value =
        serde_json::from_slice(&std::fs::read(common::report_path(dir.path())).unwrap()).unwrap();
    assert_eq!(stored["5.6.7.8"]["sum"], 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_builds_all_succeed() {
    let dir = TempDir::new().unwrap();
    let state = common::create_test_state(dir.path()).await;
    common::seed_clicks(&state.event_store).await;
    let server = server(state);

    for _ in 0..20 {
        let (by_ip, by_time) = tokio::join!(
            server
                .post("/report")
                .json(&json!({ "dimensions": ["SourceIP", "TimeInterval", "Destination"] }))
                .into_future(),
            server
                .post("/report")
                .json(&json!({ "dimensions": ["TimeInterval"] }))
                .into_future(),
        );
        by_ip.assert_status_ok();
        by_time.assert_status_ok();
    }

    server.get("/report").await.assert_status_ok();
}
