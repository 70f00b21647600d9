mod common;

use common::{TestApp, TEST_EMAIL};
use serde_json::json;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/health", app.http_address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(
        body,
        json!({"is_success": true, "official_email": TEST_EMAIL})
    );
}

#[tokio::test]
async fn readiness_check_works() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/ready", app.http_address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
}

#[tokio::test]
async fn root_lists_endpoints() {
    let app = TestApp::spawn().await;

    let body: serde_json::Value = app
        .client
        .get(format!("{}/", app.http_address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(body["health"], "/health");
    assert_eq!(body["bfhl"], "/bfhl");
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/health", app.http_address))
        .header("x-request-id", "req-123")
        .send()
        .await
        .expect("Failed to execute request");

    let headers = response.headers();
    assert_eq!(headers["x-request-id"], "req-123");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn metrics_endpoint_exposes_operation_counters() {
    let app = TestApp::spawn().await;

    let response = app.post_bfhl(json!({"hcf": [8, 12]})).await;
    assert_eq!(response.status().as_u16(), 200);

    let response = app
        .client
        .get(format!("{}/metrics", app.http_address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("bfhl_operations_total"));
}
