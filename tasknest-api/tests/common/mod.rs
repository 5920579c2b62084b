//! Common test utilities for integration tests
//!
//! Tests drive the real router in-process with `tower::ServiceExt::oneshot`
//! over an in-memory store, so they need neither a database nor a socket.
//! Password hashing runs with minimal Argon2 cost to keep them fast.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tasknest_api::app::{build_router, AppState};
use tasknest_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use tasknest_shared::auth::jwt::{TokenPair, TokenService};
use tasknest_shared::auth::password::PasswordConfig;
use tasknest_shared::store::MemoryStore;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Response pieces tests assert on
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Test context containing the router and the services behind it
pub struct TestContext {
    pub app: Router,
    pub config: Config,
    pub store: Arc<MemoryStore>,

    /// Same secret and lifetimes as the router's, for crafting tokens
    pub tokens: TokenService,
}

pub fn test_config(production: bool) -> Config {
    Config {
        api: ApiConfig {
            listen_url: "127.0.0.1:0".to_string(),
            production,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "memory".to_string(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout_seconds: 1,
        },
        jwt: JwtConfig {
            secret: SECRET.to_string(),
            access_ttl_secs: 3600,
            refresh_ttl_secs: 259_200,
        },
        password: PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(test_config(false))
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config.clone()).expect("valid test config");

        Self {
            app: build_router(state),
            tokens: TokenService::new(&config.jwt.secret),
            config,
            store,
        }
    }

    /// Sends one request through the router
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_request(request).await
    }

    /// Sends a pre-built request through the router
    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn register(&self, login: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/api/v1/register",
            None,
            Some(serde_json::json!({ "login": login, "password": password })),
        )
        .await
    }

    pub async fn login(&self, login: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/api/v1/login",
            None,
            Some(serde_json::json!({ "login": login, "password": password })),
        )
        .await
    }

    /// Registers a user and returns their first token pair
    pub async fn register_user(&self, login: &str, password: &str) -> TokenPair {
        let response = self.register(login, password).await;
        assert_eq!(response.status, StatusCode::OK, "register: {}", response.body);
        token_pair(&response.body)
    }

    /// Creates a task and returns the response body
    pub async fn create_task(&self, access: &str, title: &str) -> Value {
        let response = self
            .send(
                Method::POST,
                "/api/v1/tasks",
                Some(access),
                Some(serde_json::json!({ "title": title })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "create: {}", response.body);
        response.body
    }
}

/// Pulls `{token: {access, refresh}}` out of an auth response
pub fn token_pair(body: &Value) -> TokenPair {
    serde_json::from_value(body["token"].clone()).expect("token pair in body")
}
