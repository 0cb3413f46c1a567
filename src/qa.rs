use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::QaError;

/// Default question-answering endpoint (the local backend).
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/ask";

/// Text used when the service answers successfully but without an answer field.
pub const ANSWER_NOT_AVAILABLE: &str = "Answer not available.";

/// Outcome of a single question. Failures are values, never panics.
pub type Answer = Result<String, QaError>;

/// Asks free-text questions of an external answering service.
///
/// Implementations hold no state between calls.
#[async_trait]
pub trait QaClient: Send + Sync {
    async fn ask(&self, question: &str) -> Answer;
}

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

/// The service has been seen returning the text under either `answer` or
/// `response`, so both are accepted.
#[derive(Debug, Default, Deserialize)]
struct AskResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl AskResponse {
    fn into_answer(self) -> Answer {
        let text = [self.answer, self.response]
            .into_iter()
            .flatten()
            .find(|t| !t.is_empty());

        match (text, self.error) {
            (Some(text), _) => Ok(text),
            (None, Some(error)) => Err(QaError::Service(error)),
            (None, None) => Ok(ANSWER_NOT_AVAILABLE.to_string()),
        }
    }
}

/// `POST {"question": ...}` as JSON to a fixed endpoint.
pub struct HttpQaClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpQaClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    /// Use a preconfigured client, e.g. one with a request timeout.
    pub fn with_client(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, question: &str) -> Answer {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AskRequest { question })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QaError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: AskResponse =
            serde_json::from_str(&body).map_err(|e| QaError::Decode(e.to_string()))?;
        parsed.into_answer()
    }
}

impl Default for HttpQaClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl QaClient for HttpQaClient {
    async fn ask(&self, question: &str) -> Answer {
        debug!(endpoint = %self.endpoint, question, "asking");
        let answer = self.post(question).await;
        if let Err(ref e) = answer {
            warn!(endpoint = %self.endpoint, error = %e, "question failed");
        }
        answer
    }
}
