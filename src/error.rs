use thiserror::Error;

use crate::store::StoreError;

pub type EventResult<T> = Result<T, EventError>;

/// Errors produced by session operations, before any transport
/// mapping. The API layer turns these into status codes, the polling
/// client surfaces them as-is.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("could not allocate a unique access code after {attempts} attempts")]
    CodeGenerationExhausted { attempts: u32 },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EventError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
