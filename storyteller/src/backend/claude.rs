//! Story backend for Anthropic's Messages API.
//!
//! Only the streaming path is implemented: the request asks for
//! `stream: true` and the SSE body is reduced to its `text_delta` payloads.

use super::{FragmentStream, StoryBackend};
use crate::config::StoryConfig;
use crate::error::StoryError;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_BASE: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

/// Streams stories from Claude.
#[derive(Clone)]
pub struct ClaudeBackend {
    client: reqwest::Client,
    api_key: String,
    config: StoryConfig,
}

impl ClaudeBackend {
    /// Create a backend with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, StoryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoryError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config: StoryConfig::default(),
        })
    }

    /// Create a backend from the ANTHROPIC_API_KEY environment variable.
    pub fn from_env() -> Result<Self, StoryError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| StoryError::NoApiKey)?;
        if api_key.trim().is_empty() {
            return Err(StoryError::NoApiKey);
        }
        Self::new(api_key)
    }

    pub fn with_config(mut self, config: StoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    fn build_headers(&self) -> Result<HeaderMap, StoryError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| StoryError::Config(format!("Invalid API key: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    fn build_request(&self, prompt: &str) -> ApiRequest {
        ApiRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: self.config.system_prompt().to_string(),
            messages: vec![ApiMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
            stream: true,
        }
    }
}

#[async_trait]
impl StoryBackend for ClaudeBackend {
    async fn open(&self, prompt: &str) -> Result<FragmentStream, StoryError> {
        let response = self
            .client
            .post(format!("{API_BASE}/messages"))
            .headers(self.build_headers()?)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| StoryError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(StoryError::Api { status, message });
        }

        // Carry partial lines across chunks until their newline arrives.
        let stream = response
            .bytes_stream()
            .scan(SseBuffer::default(), |sse, result| {
                let fragments = match result {
                    Ok(bytes) => sse.push(&bytes),
                    Err(e) => vec![Err(StoryError::Network(e.to_string()))],
                };
                futures::future::ready(Some(fragments))
            })
            .flat_map(futures::stream::iter);

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        "claude"
    }
}

/// Line buffer for an SSE body.
///
/// Bytes are kept raw until a full line is available, so a multi-byte
/// character split across network chunks is decoded intact.
#[derive(Debug, Default)]
struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    /// Append a chunk and return the text fragments of every complete line.
    fn push(&mut self, bytes: &[u8]) -> Vec<Result<String, StoryError>> {
        self.pending.extend_from_slice(bytes);

        let mut fragments = Vec::new();
        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(fragment) = parse_data_line(line.trim_end_matches(['\n', '\r'])) {
                fragments.push(fragment);
            }
        }
        fragments
    }
}

/// Interpret one SSE line. Only `data:` lines carrying text or an error
/// produce anything; `event:` lines, blank separators, and every other
/// event type are skipped.
fn parse_data_line(line: &str) -> Option<Result<String, StoryError>> {
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<ApiStreamEvent>(data) {
        Ok(ApiStreamEvent::ContentBlockDelta {
            delta: ApiDelta::TextDelta { text },
        }) => Some(Ok(text)),
        Ok(ApiStreamEvent::Error { error }) => {
            tracing::warn!(message = %error.message, "story stream reported an error");
            Some(Err(StoryError::Stream(error.message)))
        }
        Ok(_) => None,
        Err(e) => Some(Err(StoryError::Parse(format!("SSE parse error: {e}")))),
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: usize,
    system: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiStreamEvent {
    ContentBlockDelta {
        delta: ApiDelta,
    },
    Error {
        error: ApiError,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiDelta {
    TextDelta {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
