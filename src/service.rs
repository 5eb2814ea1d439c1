//! Orchestration between transport, store and the event aggregate.
//!
//! Every mutation loads the full document, applies the change to the
//! copy and replaces the stored document. Concurrent mutations of the
//! same event resolve last-write-wins; polling clients reconverge on
//! their next fetch.

use std::sync::Arc;

use crate::auth;
use crate::error::{EventError, EventResult};
use crate::moderation::ResponseClassifier;
use crate::store::{EventStore, StoreError};
use crate::types::{Event, Question, Response, MAX_QUESTION_CHARS, MAX_RESPONSE_CHARS};

/// How many access codes to try before giving up on event creation.
const CODE_ATTEMPTS: u32 = 10;

pub struct EventService {
    store: Arc<dyn EventStore>,
    classifier: Option<Arc<dyn ResponseClassifier>>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            store,
            classifier: None,
        }
    }

    /// Screen submissions through the given classifier before storing
    /// them.
    pub fn with_classifier(
        store: Arc<dyn EventStore>,
        classifier: Arc<dyn ResponseClassifier>,
    ) -> Self {
        Self {
            store,
            classifier: Some(classifier),
        }
    }

    /// Create an event with fresh credentials and a unique access
    /// code. Two simultaneous creations can both pass the free-code
    /// check, so a duplicate report from the insert counts as a
    /// failed attempt as well.
    pub async fn create_event(&self, name: &str) -> EventResult<Event> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EventError::validation("name required"));
        }

        for _ in 0..CODE_ATTEMPTS {
            let code = auth::generate_access_code();
            if self.store.find_by_code(&code).await?.is_some() {
                continue;
            }
            let event = Event::new(
                name,
                code,
                auth::generate_admin_key(),
                auth::generate_admin_pin(),
            );
            match self.store.insert(&event).await {
                Ok(()) => {
                    tracing::info!(
                        "Created event {} with access code {}",
                        event.id,
                        event.access_code
                    );
                    return Ok(event);
                }
                Err(StoreError::DuplicateAccessCode { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(EventError::CodeGenerationExhausted {
            attempts: CODE_ATTEMPTS,
        })
    }

    pub async fn find_by_id(&self, event_id: &str) -> EventResult<Option<Event>> {
        Ok(self.store.find_by_id(event_id).await?)
    }

    pub async fn find_by_code(&self, access_code: &str) -> EventResult<Option<Event>> {
        Ok(self.store.find_by_code(access_code).await?)
    }

    async fn load(&self, event_id: &str) -> EventResult<Event> {
        self.store
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| EventError::not_found("event", event_id))
    }

    /// Post a new question; it becomes the active one.
    pub async fn add_question(&self, event_id: &str, text: &str) -> EventResult<Question> {
        let text = validate_text(text, MAX_QUESTION_CHARS, "question")?;
        let mut event = self.load(event_id).await?;
        let question = event.add_question(text);
        self.store.replace(&event).await?;
        tracing::debug!("Added question {} to event {}", question.id, event_id);
        Ok(question)
    }

    pub async fn active_question(&self, event_id: &str) -> EventResult<Option<Question>> {
        Ok(self.load(event_id).await?.active_question().cloned())
    }

    pub async fn activate_question(
        &self,
        event_id: &str,
        question_id: &str,
    ) -> EventResult<Question> {
        let mut event = self.load(event_id).await?;
        let question = event
            .activate_question(question_id)
            .ok_or_else(|| EventError::not_found("question", question_id))?;
        self.store.replace(&event).await?;
        tracing::debug!("Activated question {} in event {}", question_id, event_id);
        Ok(question)
    }

    /// Store a response under the given question. When a classifier
    /// is configured it screens the text first; a flagged response
    /// arrives already hidden. Classifier failures never block a
    /// submission.
    pub async fn submit_response(
        &self,
        event_id: &str,
        question_id: &str,
        text: &str,
        is_from_admin: bool,
        participant_id: Option<String>,
    ) -> EventResult<Response> {
        let text = validate_text(text, MAX_RESPONSE_CHARS, "response")?;

        // Screen before taking the document snapshot so a slow
        // classifier call does not widen the update race window.
        let mut response = Response::new(text, is_from_admin, participant_id);
        if let Some(classifier) = &self.classifier {
            match classifier.classify(&response.text).await {
                Ok(verdict) if verdict.inappropriate => {
                    tracing::info!(
                        "Response {} flagged by {} on submission",
                        response.id,
                        classifier.name()
                    );
                    response.is_moderated = true;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        "Classifier {} unavailable, accepting response unscreened: {}",
                        classifier.name(),
                        e
                    );
                }
            }
        }

        let mut event = self.load(event_id).await?;
        let stored = event
            .submit_response(question_id, response)
            .ok_or_else(|| EventError::not_found("question", question_id))?;
        self.store.replace(&event).await?;
        Ok(stored)
    }

    /// Hide or unhide a response, wherever it lives in the event.
    pub async fn moderate_response(
        &self,
        event_id: &str,
        response_id: &str,
        hidden: bool,
    ) -> EventResult<()> {
        let mut event = self.load(event_id).await?;
        if !event.moderate_response(response_id, hidden) {
            return Err(EventError::not_found("response", response_id));
        }
        self.store.replace(&event).await?;
        tracing::debug!(
            "Set moderation flag on response {} to {}",
            response_id,
            hidden
        );
        Ok(())
    }

    /// Remove every response of a question; returns the cleared
    /// question.
    pub async fn clear_responses(
        &self,
        event_id: &str,
        question_id: &str,
    ) -> EventResult<Question> {
        let mut event = self.load(event_id).await?;
        let question = event
            .clear_responses(question_id)
            .ok_or_else(|| EventError::not_found("question", question_id))?;
        self.store.replace(&event).await?;
        tracing::debug!("Cleared responses of question {}", question_id);
        Ok(question)
    }

    /// Flat list of all responses across every question, in posting
    /// order.
    pub async fn all_responses(&self, event_id: &str) -> EventResult<Vec<Response>> {
        Ok(self.load(event_id).await?.all_responses())
    }

    /// Check host credentials. A wrong key is a verdict, not an
    /// error: the result is `false`.
    pub async fn verify_admin(
        &self,
        event_id: &str,
        admin_key: &str,
        admin_pin: &str,
    ) -> EventResult<bool> {
        let event = self.load(event_id).await?;
        Ok(auth::verify_credentials(&event, admin_key, admin_pin))
    }
}

/// Trim and bound-check user supplied text.
fn validate_text(text: &str, max_chars: usize, what: &str) -> EventResult<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(EventError::validation(format!("{what} text required")));
    }
    if text.chars().count() > max_chars {
        return Err(EventError::validation(format!(
            "{what} text exceeds {max_chars} characters"
        )));
    }
    Ok(text.to_string())
}
