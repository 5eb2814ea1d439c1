//! Wire bodies shared by the HTTP API and the polling client.
//!
//! Field names follow the JSON casing participants' browsers already
//! speak, so payloads read the same on both ends of the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Event, EventId, ParticipantId, Question};

/// Public view of an event: everything except host credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    pub id: EventId,
    pub name: String,
    pub access_code: String,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<Question>,
}

impl From<Event> for EventBody {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            name: event.name,
            access_code: event.access_code,
            created_at: event.created_at,
            questions: event.questions,
        }
    }
}

/// Creation reply: the public view plus both credentials. This is
/// the only place credentials ever leave the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEventBody {
    #[serde(flatten)]
    pub event: EventBody,
    pub admin_key: String,
    pub admin_pin: String,
}

impl From<Event> for CreatedEventBody {
    fn from(event: Event) -> Self {
        let admin_key = event.admin_key.clone();
        let admin_pin = event.admin_pin.clone();
        Self {
            event: EventBody::from(event),
            admin_key,
            admin_pin,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventBody {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddQuestionBody {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseBody {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_from_admin: bool,
    #[serde(default)]
    pub participant_id: Option<ParticipantId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerateBody {
    /// A missing flag reads as unhide.
    #[serde(default)]
    pub should_hide: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyAdminBody {
    #[serde(default)]
    pub admin_key: String,
    #[serde(default)]
    pub admin_pin: String,
}

/// Generic `{ "ok": ... }` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckBody {
    pub ok: bool,
}

/// Error envelope used by every non-success API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
