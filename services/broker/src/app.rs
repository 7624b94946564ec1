//! Broker HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers. Route composition lives here
//! to keep `main` small and the router testable with `tower::ServiceExt`.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::hub::Hub;
use crate::store::Store;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub hub: Hub,
    pub store: Arc<dyn Store>,
    /// HMAC secret for bearer tokens, shared by every handler.
    pub jwt_secret: Arc<Vec<u8>>,
}

impl AppState {
    pub fn new(hub: Hub, store: Arc<dyn Store>, jwt_secret: Vec<u8>) -> Self {
        Self {
            hub,
            store,
            jwt_secret: Arc::new(jwt_secret),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            )
        });

    Router::new()
        // Public routes.
        .route("/admin/login", post(api::auth::login))
        .route("/register", post(api::auth::register))
        // Authenticated routes; role checks happen inside the handlers.
        .route("/refresh", post(api::auth::refresh))
        .route("/subscribe", post(api::pubsub::subscribe))
        .route("/unsubscribe", post(api::pubsub::unsubscribe))
        .route("/topics", get(api::pubsub::my_topics))
        .route("/send", post(api::pubsub::send))
        .route("/stats", get(api::pubsub::stats))
        // Admin surface.
        .route(
            "/admin/topics",
            get(api::admin::list_topics).post(api::admin::create_topic),
        )
        .route("/admin/topics/:name", delete(api::admin::delete_topic))
        .route(
            "/admin/topics/:name/messages",
            get(api::admin::topic_messages).delete(api::admin::clear_messages),
        )
        .route(
            "/admin/topics/:name/subscribers",
            get(api::admin::topic_subscribers).delete(api::admin::clear_subscribers),
        )
        .route("/admin/topics/:name/queue", get(api::admin::topic_queue))
        .route(
            "/admin/users",
            get(api::admin::list_users).post(api::admin::create_user),
        )
        .route("/admin/users/:username", delete(api::admin::delete_user))
        .route("/admin/token", get(api::admin::mint_user_token))
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()),
        )
        .layer(trace_layer)
        .with_state(state)
}

/// Default state over the in-memory store, for unit tests across modules.
#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let store: Arc<dyn Store> = Arc::new(crate::store::memory::InMemoryStore::new());
    let hub = Hub::new(store.clone());
    AppState::new(hub, store, b"unit-test-secret".to_vec())
}
