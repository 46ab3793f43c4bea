//! Folder API Tests

use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_defaults_created_on_first_list() {
    let app = TestApp::new();

    let first = app.get("/api/v1/folders", "alice").await;
    let second = app.get("/api/v1/folders", "alice").await;

    assert_eq!(first.status, StatusCode::OK);
    let types: Vec<&str> = first
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["folder_type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["all", "unread", "channels", "bots", "groups"]);
    assert!(first.body.as_array().unwrap().iter().all(|f| f["is_default"] == true));
    assert_eq!(first.body, second.body);
}

#[tokio::test]
async fn test_custom_folder_lists_selected_chats() {
    let app = TestApp::new();
    let team = app
        .create_chat("alice", json!({ "name": "Team", "type": "group" }))
        .await;
    app.create_chat("alice", json!({ "name": "News", "type": "channel" }))
        .await;

    let created = app
        .post(
            "/api/v1/folders",
            "alice",
            json!({ "name": "Work", "chat_ids": [team] }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["folder_type"], "custom");
    assert_eq!(created.body["order"], 5);
    assert_eq!(created.body["is_default"], false);

    let folder_id = created.body["id"].as_str().unwrap();
    let contents = app
        .get(&format!("/api/v1/folders/{}/chats", folder_id), "alice")
        .await;

    assert_eq!(contents.status, StatusCode::OK);
    assert_eq!(contents.body["folder"]["name"], "Work");
    let chats = contents.body["chats"].as_array().unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0]["id"], team.as_str());
}

#[tokio::test]
async fn test_custom_folder_rejects_foreign_chat() {
    let app = TestApp::new();
    let foreign = app
        .create_chat("mallory", json!({ "name": "Elsewhere", "type": "group" }))
        .await;

    let response = app
        .post(
            "/api/v1/folders",
            "alice",
            json!({ "name": "Work", "chat_ids": [foreign] }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_type_folders_filter_chats() {
    let app = TestApp::new();
    app.create_chat("alice", json!({ "name": "Team", "type": "group" }))
        .await;
    let news = app
        .create_chat("alice", json!({ "name": "News", "type": "channel" }))
        .await;

    let folders = app.get("/api/v1/folders", "alice").await;
    let channels_id = folders
        .body
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["folder_type"] == "channels")
        .map(|f| f["id"].as_str().unwrap().to_string())
        .unwrap();

    let contents = app
        .get(&format!("/api/v1/folders/{}/chats", channels_id), "alice")
        .await;

    let chats = contents.body["chats"].as_array().unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0]["id"], news.as_str());
}

#[tokio::test]
async fn test_default_folder_cannot_be_deleted() {
    let app = TestApp::new();
    let folders = app.get("/api/v1/folders", "alice").await;
    let default_id = folders.body[0]["id"].as_str().unwrap();

    let response = app
        .delete(&format!("/api/v1/folders/{}", default_id), "alice")
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rename_and_delete_custom_folder() {
    let app = TestApp::new();
    let created = app
        .post("/api/v1/folders", "alice", json!({ "name": "Later" }))
        .await;
    let uri = format!("/api/v1/folders/{}", created.body["id"].as_str().unwrap());

    let stranger = app.put(&uri, "bob", json!({ "name": "Mine" })).await;
    assert_eq!(stranger.status, StatusCode::NOT_FOUND);

    let renamed = app.put(&uri, "alice", json!({ "name": "Someday" })).await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["name"], "Someday");

    let deleted = app.delete(&uri, "alice").await;
    assert_eq!(deleted.status, StatusCode::OK);

    let folders = app.get("/api/v1/folders", "alice").await;
    assert_eq!(folders.body.as_array().unwrap().len(), 5);
}
