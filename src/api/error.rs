use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::EventError;
use crate::protocol::ErrorBody;

pub type ApiResult<T> = Result<T, ApiError>;

/// Carries domain errors across the handler boundary and maps them
/// onto status codes and the `{ "error": ... }` envelope.
#[derive(Debug)]
pub struct ApiError(EventError);

impl From<EventError> for ApiError {
    fn from(inner: EventError) -> Self {
        Self(inner)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            EventError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            EventError::NotFound { entity, .. } => {
                (StatusCode::NOT_FOUND, format!("{entity} not found"))
            }
            EventError::CodeGenerationExhausted { .. } => (
                StatusCode::CONFLICT,
                "could not allocate an access code, try again".to_string(),
            ),
            EventError::Store(err) => {
                tracing::error!("Store failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
