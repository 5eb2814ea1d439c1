use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{EventStore, StoreError, StoreResult};
use crate::types::{Event, EventId};

/// In-memory store, the default backend. Keeps every event for the
/// lifetime of the process.
#[derive(Default)]
pub struct MemoryStore {
    events: RwLock<HashMap<EventId, Event>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert(&self, event: &Event) -> StoreResult<()> {
        let mut events = self.events.write().await;
        if events.values().any(|e| e.access_code == event.access_code) {
            return Err(StoreError::DuplicateAccessCode {
                code: event.access_code.clone(),
            });
        }
        events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Event>> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn find_by_code(&self, access_code: &str) -> StoreResult<Option<Event>> {
        Ok(self
            .events
            .read()
            .await
            .values()
            .find(|e| e.access_code == access_code)
            .cloned())
    }

    async fn replace(&self, event: &Event) -> StoreResult<()> {
        let mut events = self.events.write().await;
        match events.get_mut(&event.id) {
            Some(slot) => {
                *slot = event.clone();
                Ok(())
            }
            None => Err(StoreError::MissingDocument {
                id: event.id.clone(),
            }),
        }
    }
}
