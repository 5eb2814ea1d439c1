//! Shared helpers for the HTTP-level integration tests.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the
//! router. Tests clone one router per request so a single in-memory
//! store stays alive across the calls of a scenario.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use liveqa::api;
use liveqa::service::EventService;
use liveqa::store::MemoryStore;

/// Build the API router backed by a fresh in-memory store.
pub fn build_test_app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(EventService::new(store));
    api::router(service)
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST without a body, for the routes that take none.
pub async fn post_empty(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
