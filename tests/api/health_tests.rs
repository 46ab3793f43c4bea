//! Health Check API Tests

use axum::http::{Method, StatusCode};

use crate::common::TestApp;

#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new();

    let response = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new();

    let response = app.request(Method::GET, "/health/live", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "alive");
}

#[tokio::test]
async fn test_readiness_reports_memory_backend() {
    let app = TestApp::new();

    let response = app.request(Method::GET, "/health/ready", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["storage"]["backend"], "memory");
    assert_eq!(response.body["storage"]["status"], "healthy");
}

#[tokio::test]
async fn test_api_requires_token() {
    let app = TestApp::new();

    let response = app.request(Method::GET, "/api/v1/chats", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Missing authorization header");
}

#[tokio::test]
async fn test_api_rejects_foreign_signature() {
    let app = TestApp::new();

    let response = app
        .request(Method::GET, "/api/v1/chats", Some("not.a.jwt"), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
