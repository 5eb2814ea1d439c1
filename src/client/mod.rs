//! Polling client for terminal front ends.
//!
//! Talks to the HTTP API the same way the hosted web pages do:
//! interval polling as the only sync mechanism, sticky question
//! selection across polls, short-lived optimistic overlays for
//! responses confirmed but not yet seen in a poll, and a session
//! file that survives restarts.

mod api;
mod reconcile;
mod session;
mod sync;

pub use api::ApiClient;
pub use reconcile::{reconcile_selection, AdminViewState, AudienceViewState};
pub use session::{resume, resume_as_admin, SessionContext};
pub use sync::{AdminView, AudienceView, SyncConfig};

use thiserror::Error;

use crate::auth::ACCESS_CODE_LEN;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Server rejected the request as invalid (HTTP 400).
    #[error("rejected by server: {0}")]
    Rejected(String),

    /// The addressed entity does not exist on the server (HTTP 404).
    #[error("{entity} not found on server")]
    NotFound { entity: &'static str },

    /// Any other non-success answer.
    #[error("server answered {status}")]
    Server { status: reqwest::StatusCode },

    /// The server could not be reached at all.
    #[error("server unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    /// Saved identifiers no longer resolve to a live event. The
    /// session file is left untouched.
    #[error("saved session no longer matches an event on the server")]
    StaleSession,

    /// Admin credentials were rejected.
    #[error("admin credentials rejected")]
    Unauthorized,

    /// Session file could not be read or written.
    #[error("session file: {0}")]
    Session(#[from] std::io::Error),

    /// JSON was malformed, e.g. a corrupt session file.
    #[error("malformed data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Normalize what a participant typed into an access code: strip
/// everything that is not a digit and keep the first five. Extra
/// trailing digits are dropped rather than rejected, so a code pasted
/// with a stray character still joins.
pub fn normalize_access_code(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.get(..ACCESS_CODE_LEN).map(str::to_string)
}
