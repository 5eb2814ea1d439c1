//! Session persistence across client restarts.
//!
//! The session file keeps role, event identifiers and admin
//! credentials so closing the terminal does not end the session.
//! Resume re-resolves those identifiers against the server; only an
//! explicit leave clears them.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::{normalize_access_code, ApiClient, ClientError, ClientResult};
use crate::protocol::EventBody;
use crate::types::{EventId, ParticipantId, QuestionId, Role};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionContext {
    pub role: Option<Role>,
    pub event_id: Option<EventId>,
    pub access_code: Option<String>,
    pub admin_key: Option<String>,
    pub admin_pin: Option<String>,
    /// Self-assigned participant id, one per event.
    pub participant_ids: HashMap<EventId, ParticipantId>,
    /// Questions this participant already answered. Advisory only;
    /// the server accepts repeat submissions.
    pub submitted_questions: HashSet<QuestionId>,
}

impl SessionContext {
    /// Read the session file. A missing file is an empty session.
    pub fn load(path: &Path) -> ClientResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> ClientResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Remember an event joined as a participant.
    pub fn remember_join(&mut self, event: &EventBody) {
        self.role = Some(Role::Participant);
        self.event_id = Some(event.id.clone());
        self.access_code = Some(event.access_code.clone());
    }

    /// Remember an event owned as its admin, credentials included.
    pub fn remember_admin(&mut self, event: &EventBody, admin_key: &str, admin_pin: &str) {
        self.role = Some(Role::Admin);
        self.event_id = Some(event.id.clone());
        self.access_code = Some(event.access_code.clone());
        self.admin_key = Some(admin_key.to_string());
        self.admin_pin = Some(admin_pin.to_string());
    }

    /// Forget everything. Only an explicit leave calls this; a failed
    /// resume keeps the identifiers around for another attempt.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The participant id for an event, minting one on first use.
    pub fn participant_id_for(&mut self, event_id: &str) -> ParticipantId {
        self.participant_ids
            .entry(event_id.to_string())
            .or_insert_with(|| format!("p_{}", Ulid::new().to_string().to_lowercase()))
            .clone()
    }

    pub fn mark_submitted(&mut self, question_id: &str) {
        self.submitted_questions.insert(question_id.to_string());
    }

    pub fn has_submitted(&self, question_id: &str) -> bool {
        self.submitted_questions.contains(question_id)
    }
}

/// Re-resolve a saved session against the server: by stored event id
/// first, then by access code. A code hit refreshes the stored id,
/// covering servers that were wiped and reseeded in between.
pub async fn resume(client: &ApiClient, session: &mut SessionContext) -> ClientResult<EventBody> {
    let Some(event_id) = session.event_id.clone() else {
        return Err(ClientError::StaleSession);
    };

    if let Some(event) = client.get_event_by_id(&event_id).await? {
        return Ok(event);
    }

    if let Some(code) = session.access_code.clone() {
        if let Some(event) = client.get_event_by_code(&code).await? {
            session.event_id = Some(event.id.clone());
            return Ok(event);
        }
    }

    Err(ClientError::StaleSession)
}

/// Take over an existing event as its admin with code, key and PIN,
/// e.g. from a new machine.
pub async fn resume_as_admin(
    client: &ApiClient,
    session: &mut SessionContext,
    code: &str,
    admin_key: &str,
    admin_pin: &str,
) -> ClientResult<EventBody> {
    let code = normalize_access_code(code)
        .ok_or_else(|| ClientError::Rejected("access code must be five digits".to_string()))?;
    let event = client
        .get_event_by_code(&code)
        .await?
        .ok_or(ClientError::NotFound { entity: "event" })?;
    if !client.verify_admin(&event.id, admin_key, admin_pin).await? {
        return Err(ClientError::Unauthorized);
    }
    session.remember_admin(&event, admin_key, admin_pin);
    Ok(event)
}
