//! Health Check API Tests

use axum::http::StatusCode;
use serde_json::Value;

use crate::TestApp;

/// The liveness probe must answer even when no backing service is reachable
#[tokio::test]
async fn test_liveness_probe_returns_ok() {
    let app = TestApp::new();

    let response = app.get("/health/live").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_liveness_probe_reports_alive() {
    let app = TestApp::new();

    let response = app.get("/health/live").await;
    let body: Value = response.json();

    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_unknown_route_returns_not_found() {
    let app = TestApp::new();

    let response = app.get("/definitely/not/a/route").await;

    response.assert_status(StatusCode::NOT_FOUND);
}
