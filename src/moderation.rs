//! Optional content screening for incoming responses.
//!
//! A classifier looks at each submission before it is stored and can
//! flag it as inappropriate, in which case the response enters the
//! event already hidden. Screening is advisory: when the classifier
//! is unreachable the submission goes through unscreened.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for classifier operations
pub type ClassifierResult<T> = Result<T, ClassifierError>;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Classifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Classifier returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Outcome of screening one submission.
#[derive(Debug, Clone, Copy)]
pub struct Verdict {
    pub inappropriate: bool,
}

/// Trait that all content classifiers implement
#[async_trait]
pub trait ResponseClassifier: Send + Sync {
    /// Judge a single piece of submitted text.
    async fn classify(&self, text: &str) -> ClassifierResult<Verdict>;

    /// Get the name of this classifier for log lines
    fn name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    inappropriate: bool,
}

/// Classifier backed by an HTTP endpoint.
///
/// The endpoint receives `{"text": "..."}` and answers
/// `{"inappropriate": true|false}`. Any moderation model can sit
/// behind that contract.
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> ClassifierResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ResponseClassifier for HttpClassifier {
    async fn classify(&self, text: &str) -> ClassifierResult<Verdict> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClassifierError::Status(response.status()));
        }

        let body: ClassifyResponse = response.json().await?;
        Ok(Verdict {
            inappropriate: body.inappropriate,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Classifier settings from environment variables.
///
/// `LIVEQA_CLASSIFIER_URL` enables screening; without it submissions
/// are stored exactly as sent.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl ClassifierConfig {
    pub fn from_env() -> Self {
        let endpoint = std::env::var("LIVEQA_CLASSIFIER_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let timeout = std::env::var("LIVEQA_CLASSIFIER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        Self { endpoint, timeout }
    }

    /// Build the configured classifier, or `None` when screening is
    /// disabled.
    pub fn build(&self) -> ClassifierResult<Option<HttpClassifier>> {
        match &self.endpoint {
            Some(endpoint) => Ok(Some(HttpClassifier::new(endpoint, self.timeout)?)),
            None => Ok(None),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
