//! Persistence behind the session service.
//!
//! Events are stored as whole documents keyed by id, with a
//! uniqueness constraint on the access code. The trait is async so a
//! database backed implementation can slot in without touching the
//! service.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::Event;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an event with access code {code} already exists")]
    DuplicateAccessCode { code: String },

    #[error("event no longer exists: {id}")]
    MissingDocument { id: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Document storage for events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new event. Fails if the access code is already taken.
    async fn insert(&self, event: &Event) -> StoreResult<()>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Event>>;

    async fn find_by_code(&self, access_code: &str) -> StoreResult<Option<Event>>;

    /// Replace the stored document wholesale. When two replacements
    /// race, the last write wins.
    async fn replace(&self, event: &Event) -> StoreResult<()>;
}
