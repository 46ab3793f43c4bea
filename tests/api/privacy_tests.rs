//! Privacy API Tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_first_read_returns_visible_defaults() {
    let app = TestApp::new();

    let response = app.get("/api/v1/privacy", "alice").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user_id"], "alice");
    assert_eq!(response.body["default_show_read_receipts"], true);
    assert_eq!(response.body["default_show_last_seen"], true);
    assert_eq!(response.body["default_show_online_status"], true);
    assert_eq!(response.body["contact_settings"], json!([]));
}

#[tokio::test]
async fn test_partial_update_keeps_other_defaults() {
    let app = TestApp::new();

    let response = app
        .put("/api/v1/privacy", "alice", json!({ "default_show_last_seen": false }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["default_show_last_seen"], false);
    assert_eq!(response.body["default_show_read_receipts"], true);
    assert_eq!(response.body["default_show_online_status"], true);
}

#[tokio::test]
async fn test_contact_override_only_affects_that_contact() {
    let app = TestApp::new();

    let response = app
        .put(
            "/api/v1/privacy/contacts",
            "alice",
            json!({ "contact_user_id": "bob", "show_last_seen_to_contact": false }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["contact_settings"][0]["contact_user_id"], "bob");

    let bob = app.get("/api/v1/privacy/visibility/alice", "bob").await;
    assert_eq!(bob.body["last_seen"], false);
    assert_eq!(bob.body["read_receipts"], true);
    assert_eq!(bob.body["online_status"], true);

    let carol = app.get("/api/v1/privacy/visibility/alice", "carol").await;
    assert_eq!(carol.body["last_seen"], true);
}

#[tokio::test]
async fn test_contact_settings_fall_back_to_defaults() {
    let app = TestApp::new();
    app.put(
        "/api/v1/privacy",
        "alice",
        json!({ "default_show_online_status": false }),
    )
    .await;

    let response = app.get("/api/v1/privacy/contacts/bob", "alice").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["contact_user_id"], "bob");
    assert_eq!(response.body["show_online_status_to_contact"], false);
    assert_eq!(response.body["show_read_receipts_to_contact"], true);
}

#[tokio::test]
async fn test_override_for_self_rejected() {
    let app = TestApp::new();

    let response = app
        .put(
            "/api/v1/privacy/contacts",
            "alice",
            json!({ "contact_user_id": "alice", "show_last_seen_to_contact": false }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_users_always_see_themselves() {
    let app = TestApp::new();
    app.put(
        "/api/v1/privacy",
        "alice",
        json!({
            "default_show_read_receipts": false,
            "default_show_last_seen": false,
            "default_show_online_status": false
        }),
    )
    .await;

    let own = app.get("/api/v1/privacy/visibility/alice", "alice").await;
    assert_eq!(own.body["read_receipts"], true);
    assert_eq!(own.body["last_seen"], true);
    assert_eq!(own.body["online_status"], true);

    let other = app.get("/api/v1/privacy/visibility/alice", "bob").await;
    assert_eq!(other.body["read_receipts"], false);
    assert_eq!(other.body["last_seen"], false);
    assert_eq!(other.body["online_status"], false);
}
