//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;

use messenger_server::config::{
    CorsSettings, DatabaseSettings, JwtSettings, MessageSettings, ServerSettings, Settings,
    StorageBackend,
};
use messenger_server::presentation::middleware::Claims;
use messenger_server::startup::{build_router, AppState};

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Settings for an in-memory application
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            backend: StorageBackend::Memory,
            url: String::new(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: 1,
            run_migrations: false,
        },
        jwt: JwtSettings {
            secret: TEST_JWT_SECRET.into(),
        },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        messages: MessageSettings {
            default_page_size: 50,
            max_page_size: 100,
            max_text_length: 4096,
            search_limit: 50,
        },
        environment: "test".into(),
    }
}

/// Sign a token for `user_id` with the test secret
pub fn token_for(user_id: &str) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        name: Some(format!("{} (test)", user_id)),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Status and parsed JSON body of a response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Test application over the in-memory backend
pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            router: build_router(AppState::in_memory(test_settings())),
        }
    }

    /// Send a request, optionally authenticated and with a JSON body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, user: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(&token_for(user)), None).await
    }

    pub async fn post(&self, uri: &str, user: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(&token_for(user)), Some(body))
            .await
    }

    pub async fn put(&self, uri: &str, user: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(&token_for(user)), Some(body))
            .await
    }

    pub async fn delete(&self, uri: &str, user: &str) -> TestResponse {
        self.request(Method::DELETE, uri, Some(&token_for(user)), None)
            .await
    }

    /// Create a chat as `owner` and return its id
    pub async fn create_chat(&self, owner: &str, body: Value) -> String {
        let response = self.post("/api/v1/chats", owner, body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["id"].as_str().unwrap().to_string()
    }

    /// Send a text message and return its id
    pub async fn send_text(&self, chat_id: &str, sender: &str, text: &str) -> String {
        let response = self
            .post(
                &format!("/api/v1/chats/{}/messages", chat_id),
                sender,
                serde_json::json!({ "text": text }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["message"]["id"].as_str().unwrap().to_string()
    }
}
