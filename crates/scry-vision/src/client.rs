//! The [`AnalysisClient`] capability and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, warn};

use crate::types::{ChatMessage, ChatRequest, ChatResponse, ContentPart, ImageUrl};

/// Response length cap; the bridge only needs a short description.
const MAX_TOKENS: u32 = 100;

/// Errors from the analysis call.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Transport-level failure (DNS, connect, TLS, read).
    #[error("analysis request failed: {0}")]
    Http(reqwest::Error),

    /// The request deadline elapsed.
    #[error("analysis request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("analysis endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (possibly truncated by the endpoint).
        body: String,
    },

    /// The response body did not contain a usable answer.
    #[error("malformed analysis response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

/// Capability that submits an image plus a prompt to a remote service and
/// returns the resulting text.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Describe a JPEG frame using the given instructional prompt.
    async fn describe(&self, jpeg: &[u8], prompt: &str) -> Result<String, AnalysisError>;
}

/// Configuration for [`HttpAnalysisClient`].
#[derive(Clone, Debug)]
pub struct VisionConfig {
    /// Base URL of the OpenAI-compatible endpoint (no trailing slash).
    pub base_url: String,
    /// Bearer credential, if the endpoint requires one.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Deadline for the whole round-trip.
    pub timeout: Duration,
}

/// [`AnalysisClient`] backed by an OpenAI-compatible chat-completions
/// endpoint.
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    config: VisionConfig,
}

impl HttpAnalysisClient {
    /// Build a client. The deadline is applied per request.
    pub fn new(config: VisionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl AnalysisClient for HttpAnalysisClient {
    async fn describe(&self, jpeg: &[u8], prompt: &str) -> Result<String, AnalysisError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(jpeg);
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt.to_string() },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{encoded}"),
                        },
                    },
                ],
            }],
            max_tokens: MAX_TOKENS,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        debug!(url = %url, image_bytes = jpeg.len(), "submitting frame for analysis");

        let mut builder = self
            .client
            .post(&url)
            .timeout(self.config.timeout)
            .json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.header(AUTHORIZATION, format!("Bearer {key}"));
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "analysis endpoint returned error status");
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AnalysisError::Malformed("no answer text in response".to_string()))
    }
}
