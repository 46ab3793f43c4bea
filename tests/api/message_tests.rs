//! Message API Tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestApp;

async fn group(app: &TestApp) -> String {
    app.create_chat(
        "alice",
        json!({ "name": "Team", "type": "group", "participants": ["bob", "carol"] }),
    )
    .await
}

#[tokio::test]
async fn test_send_and_list_oldest_first() {
    let app = TestApp::new();
    let chat_id = group(&app).await;

    for text in ["one", "two", "three"] {
        app.send_text(&chat_id, "alice", text).await;
    }

    let response = app
        .get(&format!("/api/v1/chats/{}/messages", chat_id), "bob")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let texts: Vec<&str> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
    assert_eq!(response.body[0]["sender_name"], "alice (test)");
}

#[tokio::test]
async fn test_send_updates_chat_preview() {
    let app = TestApp::new();
    let chat_id = group(&app).await;

    app.send_text(&chat_id, "bob", "latest news").await;

    let chat = app.get(&format!("/api/v1/chats/{}", chat_id), "alice").await;
    assert_eq!(chat.body["last_message"], "latest news");
}

#[tokio::test]
async fn test_reply_returns_replied_message() {
    let app = TestApp::new();
    let chat_id = group(&app).await;
    let original = app.send_text(&chat_id, "alice", "question?").await;

    let response = app
        .post(
            &format!("/api/v1/chats/{}/messages", chat_id),
            "bob",
            json!({ "text": "answer", "reply_to": original }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["message"]["reply_to"], original.as_str());
    assert_eq!(response.body["reply_to_message"]["text"], "question?");
}

#[tokio::test]
async fn test_outsider_cannot_send() {
    let app = TestApp::new();
    let chat_id = group(&app).await;

    let response = app
        .post(
            &format!("/api/v1/chats/{}/messages", chat_id),
            "mallory",
            json!({ "text": "hi" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_overlong_text_rejected() {
    let app = TestApp::new();
    let chat_id = group(&app).await;

    let response = app
        .post(
            &format!("/api/v1/chats/{}/messages", chat_id),
            "alice",
            json!({ "text": "x".repeat(4097) }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_sender_edits() {
    let app = TestApp::new();
    let chat_id = group(&app).await;
    let message_id = app.send_text(&chat_id, "bob", "typo").await;
    let uri = format!("/api/v1/messages/{}", message_id);

    let owner = app.put(&uri, "alice", json!({ "text": "rewritten" })).await;
    assert_eq!(owner.status, StatusCode::NOT_FOUND);

    let sender = app.put(&uri, "bob", json!({ "text": "fixed" })).await;
    assert_eq!(sender.status, StatusCode::OK);
    assert_eq!(sender.body["text"], "fixed");
    assert_eq!(sender.body["is_edited"], true);
    assert!(sender.body["edited_at"].is_string());
}

#[tokio::test]
async fn test_delete_hides_message_from_history() {
    let app = TestApp::new();
    let chat_id = group(&app).await;
    let message_id = app.send_text(&chat_id, "bob", "oops").await;
    let uri = format!("/api/v1/messages/{}", message_id);

    let bystander = app.delete(&uri, "carol").await;
    assert_eq!(bystander.status, StatusCode::NOT_FOUND);

    // Admins may remove anyone's message.
    let admin = app.delete(&uri, "alice").await;
    assert_eq!(admin.status, StatusCode::OK);

    let again = app.delete(&uri, "bob").await;
    assert_eq!(again.status, StatusCode::OK);

    let history = app
        .get(&format!("/api/v1/chats/{}/messages", chat_id), "bob")
        .await;
    assert_eq!(history.body, json!([]));

    let single = app.get(&uri, "bob").await;
    assert_eq!(single.body["is_deleted"], true);
}

#[tokio::test]
async fn test_pinned_messages() {
    let app = TestApp::new();
    let chat_id = group(&app).await;
    let pinned = app.send_text(&chat_id, "alice", "rules").await;
    app.send_text(&chat_id, "alice", "chatter").await;

    app.put(
        &format!("/api/v1/messages/{}", pinned),
        "alice",
        json!({ "is_pinned": true }),
    )
    .await;

    let response = app
        .get(&format!("/api/v1/chats/{}/pins", chat_id), "carol")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 1);
    assert_eq!(response.body[0]["id"], pinned.as_str());
}

#[tokio::test]
async fn test_reactions_track_users() {
    let app = TestApp::new();
    let chat_id = group(&app).await;
    let message_id = app.send_text(&chat_id, "alice", "ship it").await;
    let react = format!("/api/v1/messages/{}/react", message_id);

    app.post(&react, "bob", json!({ "emoji": "👍" })).await;
    let response = app.post(&react, "carol", json!({ "emoji": "👍" })).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["reactions"][0]["emoji"], "👍");
    assert_eq!(response.body["reactions"][0]["count"], 2);
    assert_eq!(response.body["reactions"][0]["users"], json!(["bob", "carol"]));

    let removed = app
        .delete(&format!("/api/v1/messages/{}/react/%F0%9F%91%8D", message_id), "bob")
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["reactions"][0]["count"], 1);
    assert_eq!(removed.body["reactions"][0]["users"], json!(["carol"]));
}

#[tokio::test]
async fn test_forward_reports_each_target() {
    let app = TestApp::new();
    let source = group(&app).await;
    let target = app
        .create_chat("bob", json!({ "name": "Side", "type": "group" }))
        .await;
    let foreign = app
        .create_chat("mallory", json!({ "name": "Elsewhere", "type": "group" }))
        .await;
    let message_id = app.send_text(&source, "alice", "forward me").await;

    let response = app
        .post(
            &format!("/api/v1/messages/{}/forward", message_id),
            "bob",
            json!({ "target_chat_ids": [target, target, foreign], "caption": "fyi" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total_sent"], 1);
    assert_eq!(response.body["total_failed"], 1);
    assert_eq!(response.body["successful_forwards"], json!([target]));
    assert_eq!(response.body["failed_forwards"][0]["chat_id"], foreign.as_str());

    let copies = app
        .get(&format!("/api/v1/chats/{}/messages", target), "bob")
        .await;
    assert_eq!(copies.body.as_array().unwrap().len(), 1);
    assert_eq!(copies.body[0]["forwarded_from"], "alice");
    assert_eq!(copies.body[0]["sender_id"], "bob");
}

#[tokio::test]
async fn test_search_only_covers_accessible_chats() {
    let app = TestApp::new();
    let chat_id = group(&app).await;
    let foreign = app
        .create_chat("mallory", json!({ "name": "Elsewhere", "type": "group" }))
        .await;
    app.send_text(&chat_id, "alice", "deploy window tonight").await;
    app.send_text(&chat_id, "alice", "lunch?").await;
    app.send_text(&foreign, "mallory", "deploy window moved").await;

    let response = app
        .get("/api/v1/search/messages?q=deploy%20window", "bob")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let results = response.body.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["text"], "deploy window tonight");

    let scoped = app
        .get(
            &format!("/api/v1/search/messages?q=deploy&chat_id={}", foreign),
            "bob",
        )
        .await;
    assert_eq!(scoped.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mark_chat_read_updates_unread_count() {
    let app = TestApp::new();
    let chat_id = group(&app).await;
    app.send_text(&chat_id, "alice", "one").await;
    app.send_text(&chat_id, "alice", "two").await;

    let before = app.get(&format!("/api/v1/chats/{}", chat_id), "bob").await;
    assert_eq!(before.body["unread_count"], 2);

    let read = app
        .post(&format!("/api/v1/chats/{}/read", chat_id), "bob", json!({}))
        .await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body["updated"], 2);

    let after = app.get(&format!("/api/v1/chats/{}", chat_id), "bob").await;
    assert_eq!(after.body["unread_count"], 0);
}

#[tokio::test]
async fn test_read_receipts_respect_privacy() {
    let app = TestApp::new();
    let chat_id = group(&app).await;
    let message_id = app.send_text(&chat_id, "alice", "seen?").await;

    app.put(
        "/api/v1/privacy",
        "bob",
        json!({ "default_show_read_receipts": false }),
    )
    .await;
    app.post(&format!("/api/v1/messages/{}/read", message_id), "bob", json!({}))
        .await;
    app.post(&format!("/api/v1/messages/{}/read", message_id), "carol", json!({}))
        .await;

    let uri = format!("/api/v1/messages/{}", message_id);

    let alice_view = app.get(&uri, "alice").await;
    assert_eq!(alice_view.body["read_by"], json!(["alice", "carol"]));

    let bob_view = app.get(&uri, "bob").await;
    assert_eq!(bob_view.body["read_by"], json!(["alice", "bob", "carol"]));
}
