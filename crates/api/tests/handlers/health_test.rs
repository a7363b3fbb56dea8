use axum::http::StatusCode;
use serde_json::json;

use crate::test_utils::TestContext;

#[tokio::test]
async fn test_health_check() {
    let server = TestContext::new().server();

    let response = server.get("/health").await;

    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({ "status": "ok", "service": "vitalog-api" }));
}

#[tokio::test]
async fn test_version() {
    let server = TestContext::new().server();

    let response = server.get("/version").await;

    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({ "version": env!("CARGO_PKG_VERSION") }));
}
