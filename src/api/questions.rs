//! Question posting and activation.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use super::ApiResult;
use crate::protocol::AddQuestionBody;
use crate::service::EventService;
use crate::types::Question;

/// Post a question; it becomes the active one.
///
/// POST /api/events/{event_id}/questions
pub async fn add_question(
    State(service): State<Arc<EventService>>,
    Path(event_id): Path<String>,
    Json(body): Json<AddQuestionBody>,
) -> ApiResult<Json<Question>> {
    Ok(Json(service.add_question(&event_id, &body.text).await?))
}

/// Fetch the active question, `null` when none is active.
///
/// GET /api/events/{event_id}/questions/active
pub async fn get_active_question(
    State(service): State<Arc<EventService>>,
    Path(event_id): Path<String>,
) -> ApiResult<Json<Option<Question>>> {
    Ok(Json(service.active_question(&event_id).await?))
}

/// Switch the active question.
///
/// POST /api/events/{event_id}/questions/{question_id}/activate
pub async fn activate_question(
    State(service): State<Arc<EventService>>,
    Path((event_id, question_id)): Path<(String, String)>,
) -> ApiResult<Json<Question>> {
    Ok(Json(
        service.activate_question(&event_id, &question_id).await?,
    ))
}
