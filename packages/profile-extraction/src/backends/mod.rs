//! Backend adapters.
//!
//! One adapter per wire protocol, each total over its backend's known
//! envelope shape. The orchestrator only sees the `ProfileBackend` trait and
//! the canonical `BackendResponse`; protocol quirks stay in here.

pub mod chat;
pub mod responses;

use async_trait::async_trait;

use crate::error::BackendResult;
use crate::prompts::ExtractionPrompt;
use crate::types::BackendResponse;

pub use chat::ChatCompletionsBackend;
pub use responses::ResponsesBackend;

/// An extraction backend.
///
/// Implementations wrap one provider protocol, handle their own resilient
/// transport (escalating-timeout retry), and acquire the shared dispatch
/// spacer before every outbound call.
#[async_trait]
pub trait ProfileBackend: Send + Sync {
    /// Stable provider name reported in results.
    fn name(&self) -> &str;

    /// Model this backend dispatches to.
    fn model(&self) -> &str;

    /// Run one orchestrator-visible extraction attempt.
    async fn extract(&self, prompt: &ExtractionPrompt) -> BackendResult<BackendResponse>;
}
