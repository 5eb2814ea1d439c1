//! HTTP API for the session lifecycle.
//!
//! All routes live under `/api`; everything else falls through to
//! the static frontend, wired up in `main`.

mod error;
mod events;
mod questions;
mod responses;

pub use error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};

use crate::protocol::AckBody;
use crate::service::EventService;

/// Build the API router with every session route wired up.
pub fn router(service: Arc<EventService>) -> Router {
    Router::new()
        .route("/api/events", post(events::create_event))
        .route("/api/events/code/{code}", get(events::get_event_by_code))
        .route("/api/events/{event_id}", get(events::get_event_by_id))
        .route(
            "/api/events/{event_id}/questions",
            post(questions::add_question),
        )
        .route(
            "/api/events/{event_id}/questions/active",
            get(questions::get_active_question),
        )
        .route(
            "/api/events/{event_id}/questions/{question_id}/activate",
            post(questions::activate_question),
        )
        .route(
            "/api/events/{event_id}/questions/{question_id}/responses",
            post(responses::submit_response),
        )
        .route(
            "/api/events/{event_id}/questions/{question_id}/responses/clear",
            post(responses::clear_responses),
        )
        .route(
            "/api/events/{event_id}/responses",
            get(responses::list_responses),
        )
        .route(
            "/api/events/{event_id}/responses/{response_id}/moderate",
            post(responses::moderate_response),
        )
        .route(
            "/api/events/{event_id}/admin/verify",
            post(events::verify_admin),
        )
        .route("/health", get(health))
        .with_state(service)
}

/// Liveness probe.
///
/// GET /health
async fn health() -> Json<AckBody> {
    Json(AckBody { ok: true })
}
