//! Thin typed wrapper around the HTTP API.

use std::time::Duration;

use reqwest::StatusCode;

use super::{ClientError, ClientResult};
use crate::protocol::{
    AckBody, AddQuestionBody, CreateEventBody, CreatedEventBody, ErrorBody, EventBody,
    ModerateBody, SubmitResponseBody, VerifyAdminBody,
};
use crate::types::{ParticipantId, Question, Response};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:5174`.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success answer into the matching error, pulling the
    /// server's message out of the envelope where there is one.
    async fn fail(response: reqwest::Response, entity: &'static str) -> ClientError {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return ClientError::NotFound { entity };
        }
        if status == StatusCode::BAD_REQUEST {
            if let Ok(body) = response.json::<ErrorBody>().await {
                return ClientError::Rejected(body.error);
            }
            return ClientError::Rejected("bad request".to_string());
        }
        ClientError::Server { status }
    }

    pub async fn create_event(&self, name: &str) -> ClientResult<CreatedEventBody> {
        let response = self
            .client
            .post(self.url("/api/events"))
            .json(&CreateEventBody {
                name: name.to_string(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response, "event").await);
        }
        Ok(response.json().await?)
    }

    /// Look an event up by access code. Absence is a value, not an
    /// error; the resume flow branches on it.
    pub async fn get_event_by_code(&self, code: &str) -> ClientResult<Option<EventBody>> {
        let response = self
            .client
            .get(self.url(&format!("/api/events/code/{code}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::fail(response, "event").await);
        }
        Ok(Some(response.json().await?))
    }

    pub async fn get_event_by_id(&self, event_id: &str) -> ClientResult<Option<EventBody>> {
        let response = self
            .client
            .get(self.url(&format!("/api/events/{event_id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::fail(response, "event").await);
        }
        Ok(Some(response.json().await?))
    }

    pub async fn add_question(&self, event_id: &str, text: &str) -> ClientResult<Question> {
        let response = self
            .client
            .post(self.url(&format!("/api/events/{event_id}/questions")))
            .json(&AddQuestionBody {
                text: text.to_string(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response, "event").await);
        }
        Ok(response.json().await?)
    }

    /// The currently active question, `None` when the host has not
    /// activated one (or the event is gone).
    pub async fn get_active_question(&self, event_id: &str) -> ClientResult<Option<Question>> {
        let response = self
            .client
            .get(self.url(&format!("/api/events/{event_id}/questions/active")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::fail(response, "event").await);
        }
        Ok(response.json().await?)
    }

    pub async fn activate_question(
        &self,
        event_id: &str,
        question_id: &str,
    ) -> ClientResult<Question> {
        let response = self
            .client
            .post(self.url(&format!(
                "/api/events/{event_id}/questions/{question_id}/activate"
            )))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response, "question").await);
        }
        Ok(response.json().await?)
    }

    pub async fn submit_response(
        &self,
        event_id: &str,
        question_id: &str,
        text: &str,
        is_from_admin: bool,
        participant_id: Option<ParticipantId>,
    ) -> ClientResult<Response> {
        let response = self
            .client
            .post(self.url(&format!(
                "/api/events/{event_id}/questions/{question_id}/responses"
            )))
            .json(&SubmitResponseBody {
                text: text.to_string(),
                is_from_admin,
                participant_id,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response, "question").await);
        }
        Ok(response.json().await?)
    }

    pub async fn clear_responses(
        &self,
        event_id: &str,
        question_id: &str,
    ) -> ClientResult<Question> {
        let response = self
            .client
            .post(self.url(&format!(
                "/api/events/{event_id}/questions/{question_id}/responses/clear"
            )))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::fail(response, "question").await);
        }
        Ok(response.json().await?)
    }

    /// Every response across the event. An unknown event reads as an
    /// empty list, matching how the moderation panel treats it.
    pub async fn all_responses(&self, event_id: &str) -> ClientResult<Vec<Response>> {
        let response = self
            .client
            .get(self.url(&format!("/api/events/{event_id}/responses")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(Self::fail(response, "event").await);
        }
        Ok(response.json().await?)
    }

    /// Hide or unhide a response. Any refusal reads as `false`; the
    /// next responses poll reconciles the local view either way.
    pub async fn moderate_response(
        &self,
        event_id: &str,
        response_id: &str,
        should_hide: bool,
    ) -> ClientResult<bool> {
        let response = self
            .client
            .post(self.url(&format!(
                "/api/events/{event_id}/responses/{response_id}/moderate"
            )))
            .json(&ModerateBody { should_hide })
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let ack: AckBody = response.json().await?;
        Ok(ack.ok)
    }

    /// Check admin credentials against an event.
    pub async fn verify_admin(
        &self,
        event_id: &str,
        admin_key: &str,
        admin_pin: &str,
    ) -> ClientResult<bool> {
        let response = self
            .client
            .post(self.url(&format!("/api/events/{event_id}/admin/verify")))
            .json(&VerifyAdminBody {
                admin_key: admin_key.to_string(),
                admin_pin: admin_pin.to_string(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let ack: AckBody = response.json().await?;
        Ok(ack.ok)
    }

    /// Liveness probe against `/health`.
    pub async fn health(&self) -> ClientResult<bool> {
        let response = self.client.get(self.url("/health")).send().await?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let ack: AckBody = response.json().await?;
        Ok(ack.ok)
    }
}
