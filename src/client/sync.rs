//! Polling drivers that keep view state fresh.
//!
//! Each view owns one or two background tasks that fetch on a fixed
//! cadence and publish snapshots through a watch channel. Consumers
//! either grab the latest snapshot or await changes. A failed poll is
//! logged and the previous snapshot stays in place until the next
//! tick succeeds.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{AdminViewState, ApiClient, AudienceViewState, ClientError, ClientResult};
use crate::types::{EventId, ParticipantId, Question, Response};

/// Cadences for the polling loops.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// How often the host re-fetches the active question.
    pub question_interval: Duration,
    /// How often the host re-fetches the moderation list.
    pub responses_interval: Duration,
    /// How often a participant re-fetches the whole event.
    pub event_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            question_interval: Duration::from_secs(5),
            responses_interval: Duration::from_secs(3),
            event_interval: Duration::from_secs(5),
        }
    }
}

/// Host-side live view over one event.
///
/// Spawning it starts two polling loops, one for the active question
/// and one for the full response list. Both run until the view is
/// dropped. Host actions that change server state trigger an
/// off-cadence refresh so the UI does not wait out the interval.
pub struct AdminView {
    client: ApiClient,
    event_id: EventId,
    state: Arc<watch::Sender<AdminViewState>>,
    tasks: Vec<JoinHandle<()>>,
}

impl AdminView {
    pub fn spawn(client: ApiClient, event_id: EventId, config: SyncConfig) -> Self {
        let (state, _) = watch::channel(AdminViewState::default());
        let state = Arc::new(state);

        let tasks = vec![
            tokio::spawn(poll_active_question(
                client.clone(),
                event_id.clone(),
                state.clone(),
                config.question_interval,
            )),
            tokio::spawn(poll_all_responses(
                client.clone(),
                event_id.clone(),
                state.clone(),
                config.responses_interval,
            )),
        ];

        Self {
            client,
            event_id,
            state,
            tasks,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Receiver that wakes on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<AdminViewState> {
        self.state.subscribe()
    }

    /// Latest snapshot.
    pub fn state(&self) -> AdminViewState {
        self.state.borrow().clone()
    }

    /// Post a new question. The server activates it, so the local
    /// view switches to it right away instead of waiting for a poll.
    pub async fn post_question(&self, text: &str) -> ClientResult<Question> {
        let question = self.client.add_question(&self.event_id, text).await?;
        self.state
            .send_modify(|s| s.apply_active_poll(Some(question.clone())));
        Ok(question)
    }

    /// Switch the active question, then refresh both resources.
    pub async fn activate(&self, question_id: &str) -> ClientResult<Question> {
        let question = self
            .client
            .activate_question(&self.event_id, question_id)
            .await?;
        self.refresh().await;
        Ok(question)
    }

    /// Submit the host's own answer to the active question. Host
    /// answers carry no participant id.
    pub async fn submit_answer(&self, text: &str) -> ClientResult<Response> {
        let question_id = self
            .state
            .borrow()
            .active_question
            .as_ref()
            .map(|q| q.id.clone())
            .ok_or_else(|| ClientError::Rejected("no active question".to_string()))?;
        let response = self
            .client
            .submit_response(&self.event_id, &question_id, text, true, None)
            .await?;
        self.refresh().await;
        Ok(response)
    }

    /// Wipe all responses from the active question.
    pub async fn clear_active(&self) -> ClientResult<Question> {
        let question_id = self
            .state
            .borrow()
            .active_question
            .as_ref()
            .map(|q| q.id.clone())
            .ok_or_else(|| ClientError::Rejected("no active question".to_string()))?;
        let question = self
            .client
            .clear_responses(&self.event_id, &question_id)
            .await?;
        self.refresh().await;
        Ok(question)
    }

    /// Hide or unhide a response. The local view flips immediately,
    /// without waiting for the server to confirm.
    pub async fn set_hidden(&self, response_id: &str, hidden: bool) -> ClientResult<bool> {
        self.state
            .send_modify(|s| s.set_hidden_local(response_id, hidden));
        self.client
            .moderate_response(&self.event_id, response_id, hidden)
            .await
    }

    /// Every question of the event, for the question switcher.
    pub async fn questions(&self) -> ClientResult<Vec<Question>> {
        let event = self
            .client
            .get_event_by_id(&self.event_id)
            .await?
            .ok_or(ClientError::NotFound { entity: "event" })?;
        Ok(event.questions)
    }

    /// The moderation list as pretty-printed JSON.
    pub fn export_responses(&self) -> ClientResult<String> {
        Ok(serde_json::to_string_pretty(
            &self.state.borrow().responses,
        )?)
    }

    /// Fetch both resources now, off-cadence.
    pub async fn refresh(&self) {
        let (question, responses) = futures::join!(
            self.client.get_active_question(&self.event_id),
            self.client.all_responses(&self.event_id),
        );
        match question {
            Ok(question) => self.state.send_modify(|s| s.apply_active_poll(question)),
            Err(e) => tracing::warn!("Active question refresh failed: {}", e),
        }
        match responses {
            Ok(responses) => self.state.send_modify(|s| s.apply_responses_poll(responses)),
            Err(e) => tracing::warn!("Response list refresh failed: {}", e),
        }
    }
}

impl Drop for AdminView {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Participant-side live view over one event.
///
/// Spawning it starts a single loop that polls the whole event
/// document. Question selection and freshly submitted responses are
/// reconciled locally on every poll.
pub struct AudienceView {
    client: ApiClient,
    event_id: EventId,
    participant_id: ParticipantId,
    state: Arc<watch::Sender<AudienceViewState>>,
    task: JoinHandle<()>,
}

impl AudienceView {
    pub fn spawn(
        client: ApiClient,
        event_id: EventId,
        participant_id: ParticipantId,
        config: SyncConfig,
    ) -> Self {
        let (state, _) = watch::channel(AudienceViewState::default());
        let state = Arc::new(state);

        let task = tokio::spawn(poll_event(
            client.clone(),
            event_id.clone(),
            state.clone(),
            config.event_interval,
        ));

        Self {
            client,
            event_id,
            participant_id,
            state,
            task,
        }
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    /// Receiver that wakes on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<AudienceViewState> {
        self.state.subscribe()
    }

    /// Latest snapshot.
    pub fn state(&self) -> AudienceViewState {
        self.state.borrow().clone()
    }

    /// Submit to the locally selected question. The confirmed
    /// response stays visible through the pending overlay until a
    /// poll carries it back.
    pub async fn submit(&self, text: &str) -> ClientResult<Response> {
        let question_id = self
            .state
            .borrow()
            .selected_id()
            .map(str::to_string)
            .ok_or_else(|| ClientError::Rejected("no question selected".to_string()))?;
        let response = self
            .client
            .submit_response(
                &self.event_id,
                &question_id,
                text,
                false,
                Some(self.participant_id.clone()),
            )
            .await?;
        self.state
            .send_modify(|s| s.record_submission(&question_id, response.clone()));
        Ok(response)
    }

    /// Switch to another question. Returns false and keeps the
    /// current selection when the id is not in the local list.
    pub fn select(&self, question_id: &str) -> bool {
        let mut selected = false;
        self.state.send_modify(|s| {
            selected = s.select(question_id);
        });
        selected
    }

    /// Own responses to the selected question, oldest first.
    pub fn my_responses(&self) -> Vec<Response> {
        self.state.borrow().my_responses(&self.participant_id)
    }
}

impl Drop for AudienceView {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll_active_question(
    client: ApiClient,
    event_id: EventId,
    state: Arc<watch::Sender<AdminViewState>>,
    interval: Duration,
) {
    // The first tick fires immediately, so the view fills in without
    // waiting a full interval after spawn.
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        match client.get_active_question(&event_id).await {
            Ok(question) => state.send_modify(|s| s.apply_active_poll(question)),
            Err(e) => tracing::warn!("Active question poll failed: {}", e),
        }
    }
}

async fn poll_all_responses(
    client: ApiClient,
    event_id: EventId,
    state: Arc<watch::Sender<AdminViewState>>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        match client.all_responses(&event_id).await {
            Ok(responses) => state.send_modify(|s| s.apply_responses_poll(responses)),
            Err(e) => tracing::warn!("Response list poll failed: {}", e),
        }
    }
}

async fn poll_event(
    client: ApiClient,
    event_id: EventId,
    state: Arc<watch::Sender<AudienceViewState>>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        match client.get_event_by_id(&event_id).await {
            Ok(Some(event)) => state.send_modify(|s| s.apply_poll(event.questions)),
            Ok(None) => {
                tracing::warn!("Event {} is gone from the server", event_id);
                state.send_modify(|s| s.apply_poll(Vec::new()));
            }
            Err(e) => tracing::warn!("Event poll failed: {}", e),
        }
    }
}
