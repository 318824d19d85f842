//! Profile Extraction Orchestration Library
//!
//! An LLM-backed extraction core for professional-network profile pages:
//! takes a raw HTML capture, reduces it to prompt-sized content, dispatches
//! it to language-model backends, and returns a validated structured profile.
//!
//! # Design Philosophy
//!
//! **"Never surprise the caller"**
//!
//! - One uniform outcome type; the orchestrator never raises
//! - Transient failures race a retry against a fallback backend
//! - Model output is repaired, then gated, never trusted
//! - Shared state is one injected dispatch spacer, nothing else
//!
//! # Usage
//!
//! ```rust,ignore
//! use llm_client::LlmClient;
//! use profile_extraction::{ExtractionRequest, ExtractorConfig, Orchestrator};
//!
//! let config = ExtractorConfig::from_env()?;
//! let primary = LlmClient::from_env("PRIMARY_API_KEY")?;
//! let secondary = LlmClient::from_env("SECONDARY_API_KEY")?;
//! let orchestrator = Orchestrator::from_clients(primary, secondary, config);
//!
//! let request = ExtractionRequest::new(html, "https://example.com/in/ada");
//! let result = orchestrator.run(&request).await;
//! if result.success {
//!     println!("{:?}", result.data);
//! }
//! ```
//!
//! # Modules
//!
//! - [`orchestrator`] - The attempt/race/fatal state machine
//! - [`backends`] - Protocol adapters over [`llm_client`]
//! - [`preprocess`] - HTML reduction ahead of prompting
//! - [`prompts`] - Prompt templates and the output schema
//! - [`repair`] - JSON repair and the acceptance gate
//! - [`usage`] - Token-usage normalization across backends
//! - [`rate_limit`] - Process-wide dispatch spacing
//! - [`ledger`] - Credit hold/settle seam for callers
//! - [`testing`] - Scriptable mocks for orchestrator tests

pub mod backends;
pub mod config;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod preprocess;
pub mod prompts;
pub mod rate_limit;
pub mod repair;
pub mod testing;
pub mod types;
pub mod usage;

// Re-export core types at crate root
pub use config::ExtractorConfig;
pub use error::{BackendError, BackendResult, ConfigError, LedgerError};
pub use ledger::{settle_hold, CreditLedger, HoldToken};
pub use orchestrator::Orchestrator;
pub use preprocess::{preprocess, PreprocessedDocument};
pub use prompts::{build_prompt, ExtractionPrompt};
pub use rate_limit::DispatchSpacer;
pub use repair::{repair_and_validate, RepairVerdict};
pub use types::{
    BackendAttempt, BackendResponse, ExtractedProfile, ExtractionRequest, OptimizationMode,
    OrchestrationResult, ProfileKind, UsageRecord,
};
pub use usage::normalize_usage;

pub use backends::{ChatCompletionsBackend, ProfileBackend, ResponsesBackend};
