//! Chat-completions backend adapter (fast primary).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use llm_client::{with_retries, ChatEnvelope, ChatRequest, LlmClient, Message, RetrySchedule};
use tracing::debug;

use crate::error::{BackendError, BackendResult};
use crate::prompts::ExtractionPrompt;
use crate::rate_limit::DispatchSpacer;
use crate::types::{BackendAttempt, BackendResponse};
use crate::usage::normalize_usage;

/// Backend speaking the chat-completions protocol.
pub struct ChatCompletionsBackend {
    client: LlmClient,
    name: String,
    model: String,
    max_output_tokens: u32,
    schedule: RetrySchedule,
    spacer: Arc<DispatchSpacer>,
}

impl ChatCompletionsBackend {
    /// Create an adapter over the given client and model.
    pub fn new(client: LlmClient, model: impl Into<String>, spacer: Arc<DispatchSpacer>) -> Self {
        Self {
            client,
            name: "chat-completions".to_string(),
            model: model.into(),
            max_output_tokens: 8_192,
            schedule: RetrySchedule::default(),
            spacer,
        }
    }

    /// Set the provider name reported in results.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the retry schedule.
    pub fn with_schedule(mut self, schedule: RetrySchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Set the completion token cap.
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max;
        self
    }

    /// Total parse over this protocol's envelope. The only fallback is
    /// stringifying the whole envelope, kept as a last resort because this
    /// protocol has changed shape across provider versions.
    fn envelope_text(envelope: &ChatEnvelope) -> BackendResult<String> {
        match envelope.text() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => serde_json::to_string(envelope)
                .map_err(|e| BackendError::Envelope(e.to_string())),
        }
    }
}

#[async_trait]
impl super::ProfileBackend for ChatCompletionsBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn extract(&self, prompt: &ExtractionPrompt) -> BackendResult<BackendResponse> {
        let request = ChatRequest::new(&self.model)
            .message(Message::system(&prompt.system))
            .message(Message::user(&prompt.user))
            .temperature(0.0)
            .max_tokens(self.max_output_tokens)
            .json_output();

        let total_budget: Duration = (0..self.schedule.attempts())
            .map(|i| self.schedule.budget(i))
            .sum();
        let attempt = BackendAttempt::begin(&self.name, total_budget);

        let client = self.client.clone();
        let spacer = self.spacer.clone();
        let exchange = with_retries(&self.schedule, move |_, budget| {
            let client = client.clone();
            let spacer = spacer.clone();
            let request = request.clone();
            async move {
                spacer.acquire().await;
                client.chat_completion(&request, budget).await
            }
        })
        .await
        .map_err(BackendError::from)?;

        let raw_text = Self::envelope_text(&exchange.body)?;
        let request_id = exchange.body.id.clone().or(exchange.request_id);
        let usage = normalize_usage(exchange.body.usage.as_ref(), request_id);

        debug!(
            backend = %self.name,
            elapsed_ms = attempt.elapsed_ms(),
            output_tokens = ?usage.output_tokens,
            "chat-completions attempt succeeded"
        );

        Ok(BackendResponse {
            backend: self.name.clone(),
            model: exchange.body.model.clone().unwrap_or_else(|| self.model.clone()),
            raw_text,
            usage,
            http_status: Some(exchange.status),
            elapsed_ms: attempt.elapsed_ms(),
        })
    }
}
