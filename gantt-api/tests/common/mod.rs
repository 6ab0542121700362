//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An in-memory store seeded with two accounts (alice, bob)
//! - JWT token generation
//! - Request helpers that drive the router without a socket

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use gantt_api::app::{build_router, AppState};
use gantt_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use gantt_shared::auth::jwt::{create_token, Claims};
use gantt_shared::auth::password::{hash_password_with, PasswordCost};
use gantt_shared::models::user::{CreateUser, User};
use gantt_shared::store::memory::MemoryStore;
use gantt_shared::store::TaskStore;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const PASSWORD: &str = "correct horse";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
    pub alice: User,
    pub bob: User,
    pub alice_token: String,
    pub bob_token: String,
}

/// Options for [`TestContext::with`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub open_mode: bool,
    pub development: bool,
}

impl TestContext {
    /// Closed mode: every mutation needs a token
    pub async fn new() -> Self {
        Self::with(Options::default()).await
    }

    pub async fn open() -> Self {
        Self::with(Options {
            open_mode: true,
            ..Default::default()
        })
        .await
    }

    pub async fn with(options: Options) -> Self {
        let store = Arc::new(MemoryStore::new());
        let alice = create_account(&store, "alice", Some("Alice")).await;
        let bob = create_account(&store, "bob", None).await;

        let alice_token = token_for(&alice);
        let bob_token = token_for(&bob);

        let app = build_router(AppState::new(store.clone(), test_config(options)));

        Self {
            store,
            app,
            alice,
            bob,
            alice_token,
            bob_token,
        }
    }

    /// Sends a request and returns the status with the parsed JSON body
    ///
    /// An empty body parses as `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Creates a task as alice and returns its id
    pub async fn alice_task(&self, name: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/tasks/alice",
                Some(&self.alice_token),
                serde_json::json!({"name": name, "start": "2025-02-01", "end": "2025-02-10"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["task"]["id"].as_i64().unwrap()
    }
}

pub fn test_config(options: Options) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            open_mode: options.open_mode,
            development: options.development,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
    }
}

pub async fn create_account(store: &MemoryStore, username: &str, full_name: Option<&str>) -> User {
    store
        .create_user(CreateUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: hash_password_with(PASSWORD, PasswordCost::light()).unwrap(),
            full_name: full_name.map(str::to_string),
        })
        .await
        .unwrap()
}

pub fn token_for(user: &User) -> String {
    create_token(&Claims::new(user.id, user.username.clone()), JWT_SECRET).unwrap()
}
