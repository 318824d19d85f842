//! Attempt, response, usage, and outcome types.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::types::profile::ExtractedProfile;

/// One dispatched backend call. Many may exist concurrently during a race,
/// but at most one is ever adopted.
#[derive(Debug, Clone)]
pub struct BackendAttempt {
    /// Backend the call went to
    pub backend: String,

    /// Total timeout budget for the call
    pub timeout_budget: Duration,

    /// When the call was dispatched
    pub started_at: Instant,
}

impl BackendAttempt {
    /// Start tracking a dispatched call.
    pub fn begin(backend: impl Into<String>, timeout_budget: Duration) -> Self {
        Self {
            backend: backend.into(),
            timeout_budget,
            started_at: Instant::now(),
        }
    }

    /// Milliseconds since dispatch.
    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }
}

/// Canonical token-usage record.
///
/// Every field is optional: `None` means the backend did not report the
/// number, which is different from a reported zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageRecord {
    /// Tokens in the prompt
    pub input_tokens: Option<u64>,

    /// Tokens in the completion
    pub output_tokens: Option<u64>,

    /// Total tokens, when reported directly
    pub total_tokens: Option<u64>,

    /// Provider request id, for support escalations
    pub request_id: Option<String>,
}

impl UsageRecord {
    /// True when the backend reported nothing at all.
    pub fn is_empty(&self) -> bool {
        self.input_tokens.is_none()
            && self.output_tokens.is_none()
            && self.total_tokens.is_none()
            && self.request_id.is_none()
    }
}

/// Raw, unvalidated output of one backend attempt.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    /// Backend that produced the response
    pub backend: String,

    /// Model that produced the response
    pub model: String,

    /// Raw completion text before repair
    pub raw_text: String,

    /// Normalized token usage
    pub usage: UsageRecord,

    /// HTTP status of the winning exchange
    pub http_status: Option<u16>,

    /// Wall-clock milliseconds for the attempt, retries included
    pub elapsed_ms: u64,
}

/// The uniform outcome crossing the core's boundary.
///
/// The orchestrator never raises errors to its caller; every path, including
/// backend exceptions, is folded into this record. `user_message` is short and
/// non-technical; provider/HTTP detail goes to logs only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationResult {
    /// Whether a validated profile was produced
    pub success: bool,

    /// The validated profile, on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ExtractedProfile>,

    /// Backend that produced the adopted result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Model that produced the adopted result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Token usage for the adopted attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageRecord>,

    /// Raw backend text, kept for diagnosis of repair failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,

    /// Whether the caller may reasonably prompt the user to retry
    pub transient: bool,

    /// Short, non-technical failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,

    /// Suggested HTTP status for the transport layer; not serialized into
    /// the response body
    #[serde(skip, default = "default_status_hint")]
    pub http_status_hint: u16,
}

fn default_status_hint() -> u16 {
    200
}

impl OrchestrationResult {
    /// A validated success from an adopted backend response.
    pub fn adopted(profile: ExtractedProfile, response: BackendResponse) -> Self {
        Self {
            success: true,
            data: Some(profile),
            provider: Some(response.backend),
            model: Some(response.model),
            usage: Some(response.usage),
            raw_response: Some(response.raw_text),
            transient: false,
            user_message: None,
            http_status_hint: 200,
        }
    }

    /// Input rejected before any backend call (oversized page).
    pub fn rejected(user_message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            provider: None,
            model: None,
            usage: None,
            raw_response: None,
            transient: false,
            user_message: Some(user_message.into()),
            http_status_hint: 413,
        }
    }

    /// A backend response arrived but could not be repaired into a usable
    /// profile.
    pub fn unusable(response: BackendResponse) -> Self {
        Self {
            success: false,
            data: None,
            provider: Some(response.backend),
            model: Some(response.model),
            usage: Some(response.usage),
            raw_response: Some(response.raw_text),
            transient: false,
            user_message: Some("We couldn't read this profile page. Please try again.".into()),
            http_status_hint: 502,
        }
    }

    /// All attempts failed at the transport level.
    pub fn backend_failure(error: &BackendError) -> Self {
        let transient = error.is_transient();
        let http_status_hint = error
            .status()
            .unwrap_or(if transient { 503 } else { 502 });
        let user_message = if transient {
            "The extraction service is busy right now. Please try again in a moment."
        } else {
            "Profile extraction is temporarily unavailable."
        };

        Self {
            success: false,
            data: None,
            provider: None,
            model: None,
            usage: None,
            raw_response: None,
            transient,
            user_message: Some(user_message.into()),
            http_status_hint,
        }
    }
}
