use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChatError;

/// Answer recorded when a response parses but carries no candidate text.
pub const NO_RESPONSE: &str = "No response";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<RequestContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestPart {
    pub text: String,
}

impl GenerateRequest {
    /// Wraps `question` as the sole content part.
    pub fn new(question: &str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: question.to_string(),
                }],
            }],
        }
    }
}

// Every level is optional: the endpoint may omit any of them (safety blocks,
// error payloads) and that is not a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Builds a response carrying a single candidate with one text part.
    pub fn from_text(text: &str) -> Self {
        Self {
            candidates: Some(vec![Candidate {
                content: Some(CandidateContent {
                    parts: Some(vec![ResponsePart {
                        text: Some(text.to_string()),
                    }]),
                }),
            }]),
        }
    }
}

/// Reads `candidates[0].content.parts[0].text`, falling back to
/// [`NO_RESPONSE`] when any step is missing or the text is empty.
pub fn extract_answer(response: &GenerateResponse) -> String {
    response
        .candidates
        .as_deref()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.as_deref())
        .and_then(|parts| parts.first())
        .and_then(|part| part.text.as_deref())
        .filter(|text| !text.is_empty())
        .unwrap_or(NO_RESPONSE)
        .to_string()
}

/// Anything that can answer a question. The session only talks to this.
#[async_trait]
pub trait Generate: Send + Sync {
    async fn generate(&self, question: &str) -> Result<GenerateResponse, ChatError>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Like [`GeminiClient::new`] but every request gives up after `timeout`.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, ChatError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Generate for GeminiClient {
    async fn generate(&self, question: &str) -> Result<GenerateResponse, ChatError> {
        let request = GenerateRequest::new(question);

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "generate response received");

        if !status.is_success() {
            return Err(ChatError::Status { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
