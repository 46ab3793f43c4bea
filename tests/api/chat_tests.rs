//! Chat API Tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_create_group_sets_owner_and_members() {
    let app = TestApp::new();

    let response = app
        .post(
            "/api/v1/chats",
            "alice",
            json!({ "name": "Team", "type": "group", "participants": ["bob", "alice"] }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["type"], "group");
    assert_eq!(response.body["owner"], "alice");
    assert_eq!(response.body["members"], json!(["alice", "bob"]));
    assert_eq!(response.body["admins"], json!(["alice"]));
    assert_eq!(response.body["unread_count"], 0);
}

#[tokio::test]
async fn test_create_rejects_unknown_type_and_empty_name() {
    let app = TestApp::new();

    let bad_type = app
        .post("/api/v1/chats", "alice", json!({ "name": "x", "type": "forum" }))
        .await;
    assert_eq!(bad_type.status, StatusCode::BAD_REQUEST);

    let empty_name = app
        .post("/api/v1/chats", "alice", json!({ "name": "", "type": "group" }))
        .await;
    assert_eq!(empty_name.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_private_chat_hidden_from_outsiders() {
    let app = TestApp::new();
    let chat_id = app
        .create_chat("alice", json!({ "name": "dm", "type": "private", "participants": ["bob"] }))
        .await;

    let bob = app.get(&format!("/api/v1/chats/{}", chat_id), "bob").await;
    assert_eq!(bob.status, StatusCode::OK);

    let mallory = app.get(&format!("/api/v1/chats/{}", chat_id), "mallory").await;
    assert_eq!(mallory.status, StatusCode::NOT_FOUND);
    assert_eq!(mallory.body["message"], "Chat not found");
}

#[tokio::test]
async fn test_invalid_chat_id_is_bad_request() {
    let app = TestApp::new();

    let response = app.get("/api/v1/chats/not-a-uuid", "alice").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_join_public_channel_counts_subscriber_once() {
    let app = TestApp::new();
    let chat_id = app
        .create_chat("alice", json!({ "name": "News", "type": "channel", "is_public": true }))
        .await;
    let join = format!("/api/v1/chats/{}/join", chat_id);

    let first = app.post(&join, "bob", json!({})).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["message"], "Joined chat");

    let second = app.post(&join, "bob", json!({})).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["message"], "Already a member");

    let chat = app.get(&format!("/api/v1/chats/{}", chat_id), "bob").await;
    assert_eq!(chat.body["subscribers_count"], 2);
    assert_eq!(chat.body["members"], json!(["alice", "bob"]));
}

#[tokio::test]
async fn test_private_chat_cannot_be_joined() {
    let app = TestApp::new();
    let chat_id = app
        .create_chat("alice", json!({ "name": "dm", "type": "private", "participants": ["bob"] }))
        .await;

    let response = app
        .post(&format!("/api/v1/chats/{}/join", chat_id), "mallory", json!({}))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_leave_rules() {
    let app = TestApp::new();
    let chat_id = app
        .create_chat("alice", json!({ "name": "Team", "type": "group", "participants": ["bob"] }))
        .await;
    let leave = format!("/api/v1/chats/{}/leave", chat_id);

    let owner = app.post(&leave, "alice", json!({})).await;
    assert_eq!(owner.status, StatusCode::BAD_REQUEST);

    let member = app.post(&leave, "bob", json!({})).await;
    assert_eq!(member.status, StatusCode::OK);

    let after = app.get(&format!("/api/v1/chats/{}", chat_id), "bob").await;
    assert_eq!(after.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_managers_update_details() {
    let app = TestApp::new();
    let chat_id = app
        .create_chat("alice", json!({ "name": "Team", "type": "group", "participants": ["bob"] }))
        .await;
    let uri = format!("/api/v1/chats/{}", chat_id);

    let member = app.put(&uri, "bob", json!({ "name": "Hijacked" })).await;
    assert_eq!(member.status, StatusCode::NOT_FOUND);

    let owner = app
        .put(&uri, "alice", json!({ "name": "Core Team", "description": "daily" }))
        .await;
    assert_eq!(owner.status, StatusCode::OK);
    assert_eq!(owner.body["name"], "Core Team");
    assert_eq!(owner.body["description"], "daily");
}

#[tokio::test]
async fn test_archive_moves_chat_between_lists() {
    let app = TestApp::new();
    let chat_id = app
        .create_chat("alice", json!({ "name": "Team", "type": "group" }))
        .await;

    let archive = app
        .post(&format!("/api/v1/chats/{}/archive", chat_id), "alice", json!({ "archived": true }))
        .await;
    assert_eq!(archive.status, StatusCode::OK);

    let active = app.get("/api/v1/chats", "alice").await;
    assert_eq!(active.body, json!([]));

    let archived = app.get("/api/v1/chats/archived", "alice").await;
    assert_eq!(archived.body[0]["id"], chat_id.as_str());
    assert_eq!(archived.body[0]["is_archived"], true);
}

#[tokio::test]
async fn test_list_filters_by_type() {
    let app = TestApp::new();
    app.create_chat("alice", json!({ "name": "Team", "type": "group" })).await;
    let channel = app
        .create_chat("alice", json!({ "name": "News", "type": "channel" }))
        .await;

    let response = app.get("/api/v1/chats?type=channel", "alice").await;

    assert_eq!(response.status, StatusCode::OK);
    let chats = response.body.as_array().unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0]["id"], channel.as_str());
}

#[tokio::test]
async fn test_delete_is_owner_only_and_removes_messages() {
    let app = TestApp::new();
    let chat_id = app
        .create_chat("alice", json!({ "name": "Team", "type": "group", "participants": ["bob"] }))
        .await;
    let message_id = app.send_text(&chat_id, "bob", "hello").await;
    let uri = format!("/api/v1/chats/{}", chat_id);

    let member = app.delete(&uri, "bob").await;
    assert_eq!(member.status, StatusCode::NOT_FOUND);

    let owner = app.delete(&uri, "alice").await;
    assert_eq!(owner.status, StatusCode::OK);
    assert_eq!(owner.body["success"], true);

    assert_eq!(app.get(&uri, "alice").await.status, StatusCode::NOT_FOUND);
    let message = app
        .get(&format!("/api/v1/messages/{}", message_id), "bob")
        .await;
    assert_eq!(message.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_chats_include_default_folders() {
    let app = TestApp::new();
    app.create_chat("alice", json!({ "name": "Team", "type": "group" })).await;

    let response = app.get("/api/v1/users/chats", "alice").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user_id"], "alice");
    assert_eq!(response.body["chats"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["folders"].as_array().unwrap().len(), 5);
}
