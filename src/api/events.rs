//! Event creation, lookup and host verification.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use super::ApiResult;
use crate::error::EventError;
use crate::protocol::{AckBody, CreateEventBody, CreatedEventBody, EventBody, VerifyAdminBody};
use crate::service::EventService;

/// Create a new event.
///
/// POST /api/events
///
/// The reply carries the admin key and PIN. They are not retrievable
/// afterwards, so the caller has to hold on to them.
pub async fn create_event(
    State(service): State<Arc<EventService>>,
    Json(body): Json<CreateEventBody>,
) -> ApiResult<Json<CreatedEventBody>> {
    let event = service.create_event(&body.name).await?;
    Ok(Json(CreatedEventBody::from(event)))
}

/// Look up an event by the access code participants type in.
///
/// GET /api/events/code/{code}
pub async fn get_event_by_code(
    State(service): State<Arc<EventService>>,
    Path(code): Path<String>,
) -> ApiResult<Json<EventBody>> {
    let event = service
        .find_by_code(&code)
        .await?
        .ok_or_else(|| EventError::not_found("event", &code))?;
    Ok(Json(EventBody::from(event)))
}

/// Fetch the full event document, questions and responses included.
///
/// GET /api/events/{event_id}
pub async fn get_event_by_id(
    State(service): State<Arc<EventService>>,
    Path(event_id): Path<String>,
) -> ApiResult<Json<EventBody>> {
    let event = service
        .find_by_id(&event_id)
        .await?
        .ok_or_else(|| EventError::not_found("event", &event_id))?;
    Ok(Json(EventBody::from(event)))
}

/// Check host credentials.
///
/// POST /api/events/{event_id}/admin/verify
///
/// Wrong credentials answer `{ "ok": false }` with status 200; only
/// an unknown event is an error.
pub async fn verify_admin(
    State(service): State<Arc<EventService>>,
    Path(event_id): Path<String>,
    Json(body): Json<VerifyAdminBody>,
) -> ApiResult<Json<AckBody>> {
    let ok = service
        .verify_admin(&event_id, &body.admin_key, &body.admin_pin)
        .await?;
    Ok(Json(AckBody { ok }))
}
