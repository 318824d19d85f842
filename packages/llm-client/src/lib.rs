//! Pure REST client for LLM extraction backends.
//!
//! A clean, minimal client with no domain-specific logic. Speaks the two wire
//! protocols extraction backends have used across vendor swaps: the
//! chat-completions protocol (choices array) and the responses protocol
//! (nested output/content array). Domain code adapts these envelopes; this
//! crate only moves bytes and classifies failures.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_client::{ChatRequest, LlmClient, Message};
//! use std::time::Duration;
//!
//! let client = LlmClient::from_env("EXTRACTION_API_KEY")?;
//!
//! let response = client
//!     .chat_completion(
//!         &ChatRequest::new("fast-model").message(Message::user("Hello!")),
//!         Duration::from_secs(45),
//!     )
//!     .await?;
//! ```

pub mod credentials;
pub mod error;
pub mod transport;
pub mod types;

pub use credentials::ApiKey;
pub use error::{LlmError, Result};
pub use transport::{with_retries, RetrySchedule};
pub use types::*;

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// How much of an error body to keep for logging and error messages.
const ERROR_BODY_LIMIT: usize = 600;

/// A successful HTTP exchange with a backend.
#[derive(Debug, Clone)]
pub struct LlmExchange<T> {
    /// Deserialized response envelope
    pub body: T,

    /// HTTP status of the response
    pub status: u16,

    /// Wall-clock time for the exchange
    pub elapsed: Duration,

    /// Provider request id from the `x-request-id` header, if present
    pub request_id: Option<String>,
}

/// REST client for one extraction backend endpoint.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http_client: Client,
    api_key: ApiKey,
    base_url: String,
}

impl LlmClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from an environment variable holding the API key.
    pub fn from_env(var: &str) -> Result<Self> {
        let api_key = ApiKey::from_env(var)
            .ok_or_else(|| LlmError::Config(format!("{} not set", var)))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies, gateways, alternate vendors).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion under a per-request deadline.
    pub async fn chat_completion(
        &self,
        request: &ChatRequest,
        timeout: Duration,
    ) -> Result<LlmExchange<ChatEnvelope>> {
        self.post_json("/chat/completions", request, timeout).await
    }

    /// Responses-API call under a per-request deadline.
    pub async fn create_response(
        &self,
        request: &ResponsesRequest,
        timeout: Duration,
    ) -> Result<LlmExchange<ResponsesEnvelope>> {
        self.post_json("/responses", request, timeout).await
    }

    async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<LlmExchange<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let start = Instant::now();

        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                if e.is_timeout() {
                    warn!(path, elapsed_ms, "backend request timed out");
                    LlmError::Timeout { elapsed_ms }
                } else {
                    warn!(path, error = %e, "backend request failed");
                    LlmError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            if message.len() > ERROR_BODY_LIMIT {
                let mut cut = ERROR_BODY_LIMIT;
                while !message.is_char_boundary(cut) {
                    cut -= 1;
                }
                message.truncate(cut);
            }
            warn!(path, status = status.as_u16(), error = %message, "backend API error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: T = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let elapsed = start.elapsed();
        debug!(
            path,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "backend exchange complete"
        );

        Ok(LlmExchange {
            body: envelope,
            status: status.as_u16(),
            elapsed,
            request_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = LlmClient::new("sk-test").with_base_url("https://gateway.internal/v1");
        assert_eq!(client.base_url(), "https://gateway.internal/v1");
    }

    #[test]
    fn test_client_debug_hides_key() {
        let client = LlmClient::new("sk-test");
        let debug = format!("{:?}", client);
        assert!(!debug.contains("sk-test"));
    }
}
