//! Anthropic messages API client with retry logic

use super::{ReasoningService, Stage};
use crate::config::ReasoningConfig;
use crate::error::{ErrorCode, LibResult, PacemakerError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

pub struct ClaudeClient {
    client: Client,
    api_key: String,
    endpoint: String,
    adjust_model: String,
    narrate_model: String,
    max_tokens: u32,
    temperature: f32,
    max_retries: u32,
    retry_delay: Duration,
}

impl std::fmt::Debug for ClaudeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeClient")
            .field("endpoint", &self.endpoint)
            .field("adjust_model", &self.adjust_model)
            .field("narrate_model", &self.narrate_model)
            .finish_non_exhaustive()
    }
}

impl ClaudeClient {
    pub fn new(config: &ReasoningConfig) -> LibResult<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            PacemakerError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "reasoning API key not set (ANTHROPIC_API_KEY)",
            )
        })?;

        let client = Client::builder()
            .timeout(config.stage_timeout)
            .build()
            .map_err(|e| {
                PacemakerError::config(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.clone(),
            adjust_model: config.adjust_model.clone(),
            narrate_model: config.narrate_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        })
    }

    fn model_for(&self, stage: Stage) -> &str {
        match stage {
            Stage::Adjust => &self.adjust_model,
            Stage::Narrate => &self.narrate_model,
        }
    }

    async fn send(&self, stage: Stage, prompt: &str) -> LibResult<String> {
        let request = MessagesRequest {
            model: self.model_for(stage),
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let mut retry_count = 0;
        loop {
            match self.make_request(stage, &request).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    if retry_count >= self.max_retries || !is_retryable(&e) {
                        return Err(e);
                    }

                    retry_count += 1;
                    let delay = self.calculate_backoff(retry_count);
                    warn!(
                        "Reasoning {} call failed ({}), retry {} in {:?}",
                        stage, e, retry_count, delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    async fn make_request(&self, stage: Stage, request: &MessagesRequest<'_>) -> LibResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let code = if e.is_timeout() {
                    ErrorCode::REASONING_TIMEOUT
                } else {
                    ErrorCode::REASONING_REQUEST_FAILED
                };
                PacemakerError::reasoning(code, stage.name(), format!("request failed: {}", e))
                    .with_source(e)
            })?;

        match response.status() {
            StatusCode::OK => {
                let body: MessagesResponse = response.json().await.map_err(|e| {
                    PacemakerError::reasoning(
                        ErrorCode::REASONING_INVALID_RESPONSE,
                        stage.name(),
                        format!("failed to parse response: {}", e),
                    )
                })?;

                if let Some(usage) = &body.usage {
                    debug!(
                        "Reasoning {} used {} tokens (stop: {:?})",
                        stage,
                        usage.input_tokens + usage.output_tokens,
                        body.stop_reason
                    );
                }

                let text: String = body.content.into_iter().filter_map(|block| block.text).collect();
                if text.trim().is_empty() {
                    return Err(PacemakerError::reasoning(
                        ErrorCode::REASONING_INVALID_RESPONSE,
                        stage.name(),
                        "empty completion",
                    ));
                }
                Ok(text)
            }
            StatusCode::TOO_MANY_REQUESTS => Err(PacemakerError::reasoning(
                ErrorCode::REASONING_RATE_LIMITED,
                stage.name(),
                "rate limit exceeded",
            )),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(PacemakerError::reasoning(
                ErrorCode::REASONING_UNAUTHORIZED,
                stage.name(),
                "API key rejected",
            )),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(PacemakerError::reasoning(
                    ErrorCode::REASONING_REQUEST_FAILED,
                    stage.name(),
                    format!("API error {}: {}", status, error_text),
                ))
            }
        }
    }

    /// Exponential backoff: `retry_delay * 2^(retry_count - 1)`
    fn calculate_backoff(&self, retry_count: u32) -> Duration {
        self.retry_delay * 2u32.saturating_pow(retry_count.saturating_sub(1))
    }
}

fn is_retryable(error: &PacemakerError) -> bool {
    matches!(
        error.code(),
        ErrorCode::REASONING_RATE_LIMITED
            | ErrorCode::REASONING_REQUEST_FAILED
            | ErrorCode::REASONING_TIMEOUT
    )
}

#[async_trait]
impl ReasoningService for ClaudeClient {
    async fn adjust(&self, prompt: &str) -> LibResult<String> {
        self.send(Stage::Adjust, prompt).await
    }

    async fn narrate(&self, prompt: &str) -> LibResult<String> {
        self.send(Stage::Narrate, prompt).await
    }
}
