//! Shared helpers for broker integration tests.
#![allow(dead_code)]
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use broker::app::{build_router, AppState};
use broker::auth;
use broker::connectors::{Connector, ConnectorError};
use broker::hub::Hub;
use broker::store::memory::InMemoryStore;
use broker::store::Store;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"integration-test-secret";
pub const ADMIN_PASSWORD: &str = "UOOOWWW4";

/// Connector that records every send for assertions.
#[derive(Default)]
pub struct RecordingConnector {
    sent: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingConnector {
    pub fn sent(&self) -> Vec<(String, Vec<u8>)> {
        self.sent.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Connector for RecordingConnector {
    async fn send(&self, token: &str, payload: &[u8]) -> Result<(), ConnectorError> {
        self.sent
            .lock()
            .expect("lock")
            .push((token.to_string(), payload.to_vec()));
        Ok(())
    }
}

/// Connector whose success is toggled at runtime, for retry scenarios.
pub struct FlakyConnector {
    pub fail: AtomicBool,
    pub delivered: RecordingConnector,
}

impl FlakyConnector {
    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
            delivered: RecordingConnector::default(),
        }
    }

    pub fn recover(&self) {
        self.fail.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for FlakyConnector {
    async fn send(&self, token: &str, payload: &[u8]) -> Result<(), ConnectorError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ConnectorError::Unavailable("forced failure".into()));
        }
        self.delivered.send(token, payload).await
    }
}

pub struct TestApp {
    pub router: Router,
    pub hub: Hub,
    pub store: Arc<dyn Store>,
    pub mock: Arc<RecordingConnector>,
}

/// Build an app over the in-memory store with the admin account
/// bootstrapped and a recording connector registered as `mock`.
pub async fn test_app() -> TestApp {
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    auth::ensure_admin_user(&store, Some(ADMIN_PASSWORD))
        .await
        .expect("bootstrap admin");

    let hub = Hub::new(store.clone());
    let mock = Arc::new(RecordingConnector::default());
    hub.register_connector("mock", mock.clone());

    let state = AppState::new(hub.clone(), store.clone(), TEST_SECRET.to_vec());
    TestApp {
        router: build_router(state),
        hub,
        store,
        mock,
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn authed_request(
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"));
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

/// Log in as the bootstrapped admin and return the bearer token.
pub async fn admin_token(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/admin/login",
            serde_json::json!({"username": "admin", "password": ADMIN_PASSWORD}),
        ))
        .await
        .expect("login");
    assert_eq!(response.status(), StatusCode::OK);
    read_json(response).await["token"]
        .as_str()
        .expect("token")
        .to_string()
}

/// Create a user through the admin API and mint a token for it.
pub async fn user_token(app: &Router, admin: &str, username: &str, role: &str) -> String {
    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/admin/users",
            admin,
            Some(serde_json::json!({
                "username": username,
                "password": "test123",
                "role": role,
            })),
        ))
        .await
        .expect("create user");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(authed_request(
            "GET",
            &format!("/admin/token?username={username}"),
            admin,
            None,
        ))
        .await
        .expect("mint token");
    assert_eq!(response.status(), StatusCode::OK);
    read_json(response).await["token"]
        .as_str()
        .expect("token")
        .to_string()
}
