//! Response submission, listing and moderation.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use super::ApiResult;
use crate::protocol::{AckBody, ModerateBody, SubmitResponseBody};
use crate::service::EventService;
use crate::types::{Question, Response};

/// Submit a response to a question.
///
/// POST /api/events/{event_id}/questions/{question_id}/responses
pub async fn submit_response(
    State(service): State<Arc<EventService>>,
    Path((event_id, question_id)): Path<(String, String)>,
    Json(body): Json<SubmitResponseBody>,
) -> ApiResult<Json<Response>> {
    let response = service
        .submit_response(
            &event_id,
            &question_id,
            &body.text,
            body.is_from_admin,
            body.participant_id,
        )
        .await?;
    Ok(Json(response))
}

/// Drop every response of a question; answers with the cleared
/// question.
///
/// POST /api/events/{event_id}/questions/{question_id}/responses/clear
pub async fn clear_responses(
    State(service): State<Arc<EventService>>,
    Path((event_id, question_id)): Path<(String, String)>,
) -> ApiResult<Json<Question>> {
    Ok(Json(
        service.clear_responses(&event_id, &question_id).await?,
    ))
}

/// Flat list of every response in the event, for the moderation
/// panel and the export.
///
/// GET /api/events/{event_id}/responses
pub async fn list_responses(
    State(service): State<Arc<EventService>>,
    Path(event_id): Path<String>,
) -> ApiResult<Json<Vec<Response>>> {
    Ok(Json(service.all_responses(&event_id).await?))
}

/// Hide or unhide a single response.
///
/// POST /api/events/{event_id}/responses/{response_id}/moderate
pub async fn moderate_response(
    State(service): State<Arc<EventService>>,
    Path((event_id, response_id)): Path<(String, String)>,
    Json(body): Json<ModerateBody>,
) -> ApiResult<Json<AckBody>> {
    service
        .moderate_response(&event_id, &response_id, body.should_hide)
        .await?;
    Ok(Json(AckBody { ok: true }))
}
