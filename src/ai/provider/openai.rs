//! OpenAI API Provider
//!
//! LLM provider using the OpenAI Chat Completions API (or any compatible
//! endpoint). Requests JSON-mode output and returns the raw text with token
//! usage; parsing and validation happen downstream.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{LlmProvider, LlmResponse, ModelParams, ResponseMetadata, ResponseTiming, TokenUsage};
use crate::ai::prompt::RenderedPrompt;
use crate::config::LlmConfig;
use crate::constants::network::ERROR_BODY_PREVIEW_CHARS;
use crate::types::{ErrorClassifier, Result, SentimentError};

const PROVIDER_NAME: &str = "openai";

/// OpenAI API Provider with secure API key handling
pub struct OpenAiProvider {
    /// API key stored securely - never exposed in logs or debug output
    api_key: Option<SecretString>,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl OpenAiProvider {
    /// Build the provider. A missing key is not an error here; the analyzer
    /// reports it as a configuration failure before any request is made.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        url::Url::parse(&config.api_base).map_err(|e| {
            SentimentError::config(format!("Invalid api_base '{}': {}", config.api_base, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| SentimentError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn build_request(&self, prompt: &RenderedPrompt, params: &ModelParams) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: params.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                },
            ],
            temperature: params.temperature,
            max_tokens: Some(params.max_tokens),
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn classify_transport(err: reqwest::Error, timeout: Duration) -> SentimentError {
    if err.is_timeout() {
        return SentimentError::timeout("OpenAI request", timeout);
    }
    if let Some(status) = err.status() {
        return ErrorClassifier::classify_http_status(
            status.as_u16(),
            &err.to_string(),
            None,
            timeout,
        );
    }
    ErrorClassifier::classify(&format!("OpenAI request failed: {}", err), timeout)
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(
        &self,
        prompt: &RenderedPrompt,
        params: &ModelParams,
    ) -> Result<LlmResponse> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            SentimentError::config(
                "OpenAI API key not found. Set OPENAI_API_KEY env var or provide llm.api_key",
            )
        })?;

        info!(
            "Generating with OpenAI (model: {}, temperature: {})",
            params.model, params.temperature
        );

        let start_time = Instant::now();
        let request = self.build_request(prompt, params);
        let url = format!("{}/chat/completions", self.api_base);

        debug!("Sending request to OpenAI API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .timeout(params.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_transport(e, params.timeout))?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("OpenAI API error: {}", preview),
                retry_after,
                params.timeout,
            ));
        }

        let response_body: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SentimentError::timeout("OpenAI response body", params.timeout)
            } else {
                SentimentError::unknown(format!("Failed to decode OpenAI response: {}", e))
            }
        })?;

        let elapsed = start_time.elapsed();

        let usage = response_body
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));

        let choice = response_body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SentimentError::unknown("No choices in OpenAI response"))?;

        if choice.finish_reason.as_deref() == Some("length") {
            warn!(
                "OpenAI response hit max_tokens ({}); output is likely truncated",
                params.max_tokens
            );
        }

        let content = choice
            .message
            .content
            .ok_or_else(|| SentimentError::unknown("No content in OpenAI response"))?;

        debug!("Received {} chars from OpenAI in {:?}", content.len(), elapsed);

        Ok(LlmResponse {
            content,
            usage,
            timing: ResponseTiming::from_duration(elapsed),
            metadata: ResponseMetadata {
                model: params.model.clone(),
                provider: PROVIDER_NAME.to_string(),
            },
        })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}
