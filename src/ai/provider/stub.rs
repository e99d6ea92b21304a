//! Scripted provider for pipeline tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{LlmProvider, LlmResponse, ModelParams, TokenUsage};
use crate::ai::prompt::RenderedPrompt;
use crate::types::{Result, SentimentError};

/// Usage reported by scripted responses unless told otherwise
pub(crate) const STUB_USAGE: TokenUsage = TokenUsage {
    input_tokens: 1_500,
    output_tokens: 400,
};

pub(crate) struct StubProvider {
    responses: Mutex<VecDeque<Result<LlmResponse>>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    configured: bool,
    last_prompt: Mutex<Option<RenderedPrompt>>,
    last_params: Mutex<Option<ModelParams>>,
}

impl StubProvider {
    pub(crate) fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            delay: None,
            configured: true,
            last_prompt: Mutex::new(None),
            last_params: Mutex::new(None),
        }
    }

    pub(crate) fn respond_with(self, content: impl Into<String>) -> Self {
        self.push(Ok(LlmResponse::content_only(content).with_usage(STUB_USAGE)))
    }

    pub(crate) fn respond_without_usage(self, content: impl Into<String>) -> Self {
        self.push(Ok(LlmResponse::content_only(content)))
    }

    pub(crate) fn fail_with(self, err: SentimentError) -> Self {
        self.push(Err(err))
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_prompt(&self) -> Option<RenderedPrompt> {
        self.last_prompt.lock().unwrap().clone()
    }

    pub(crate) fn last_params(&self) -> Option<ModelParams> {
        self.last_params.lock().unwrap().clone()
    }

    fn push(self, response: Result<LlmResponse>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    async fn generate(&self, prompt: &RenderedPrompt, params: &ModelParams) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.clone());
        *self.last_params.lock().unwrap() = Some(params.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SentimentError::unknown("stub has no scripted response")))
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}
