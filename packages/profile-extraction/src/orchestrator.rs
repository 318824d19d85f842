//! Extraction orchestrator.
//!
//! Drives one request through size gating, preprocessing, prompt building,
//! and the backend state machine: try the primary; on a transient failure
//! race a primary retry against the secondary and adopt the first validated
//! profile; on anything fatal, stop. Every path folds into an
//! `OrchestrationResult`; this module never returns `Err` to its caller.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backends::{ChatCompletionsBackend, ProfileBackend, ResponsesBackend};
use crate::config::ExtractorConfig;
use crate::error::BackendError;
use crate::preprocess::preprocess;
use crate::prompts::{build_prompt, ExtractionPrompt};
use crate::rate_limit::DispatchSpacer;
use crate::repair::{repair_and_validate, RepairVerdict};
use crate::types::{
    BackendResponse, ExtractionRequest, ExtractedProfile, OrchestrationResult,
};
use llm_client::LlmClient;

/// Outcome of one backend attempt after repair and validation.
enum AttemptOutcome {
    /// Validated profile; this attempt wins.
    Adopted(Box<ExtractedProfile>, BackendResponse),
    /// Response arrived but did not repair into an acceptable profile.
    Unusable(BackendResponse),
    /// Transport-level failure.
    Failed(BackendError),
}

/// Orchestrates extraction across a primary and a secondary backend.
pub struct Orchestrator {
    primary: Arc<dyn ProfileBackend>,
    secondary: Arc<dyn ProfileBackend>,
    config: ExtractorConfig,
}

impl Orchestrator {
    /// Build an orchestrator over explicit backends. Tests inject mocks
    /// here.
    pub fn new(
        primary: Arc<dyn ProfileBackend>,
        secondary: Arc<dyn ProfileBackend>,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            config,
        }
    }

    /// Build the standard production pairing: a chat-completions primary and
    /// a responses-protocol secondary sharing one dispatch spacer.
    pub fn from_clients(
        primary_client: LlmClient,
        secondary_client: LlmClient,
        config: ExtractorConfig,
    ) -> Self {
        let spacer = Arc::new(DispatchSpacer::from_millis(config.min_dispatch_spacing_ms));
        let schedule = config.schedule();

        let primary = ChatCompletionsBackend::new(
            primary_client,
            config.primary_model.as_str(),
            spacer.clone(),
        )
        .with_schedule(schedule.clone())
        .with_max_output_tokens(config.max_output_tokens);

        let secondary = ResponsesBackend::new(
            secondary_client,
            config.secondary_model.as_str(),
            spacer,
        )
        .with_schedule(schedule)
        .with_max_output_tokens(config.max_output_tokens);

        Self::new(Arc::new(primary), Arc::new(secondary), config)
    }

    /// Run one extraction end to end.
    pub async fn run(&self, request: &ExtractionRequest) -> OrchestrationResult {
        if request.html.trim().is_empty() {
            return OrchestrationResult::rejected("No page content was provided.");
        }
        if request.html.len() > self.config.max_html_bytes() {
            warn!(
                size_bytes = request.html.len(),
                limit_bytes = self.config.max_html_bytes(),
                "rejecting oversized page"
            );
            return OrchestrationResult::rejected(
                "This page is too large to process. Please try a smaller capture.",
            );
        }

        let document = preprocess(&request.html, request.optimization_mode);
        if document.estimated_tokens > self.config.max_estimated_tokens {
            warn!(
                estimated_tokens = document.estimated_tokens,
                limit = self.config.max_estimated_tokens,
                "rejecting page over token ceiling"
            );
            return OrchestrationResult::rejected(
                "This page is too large to process. Please try a smaller capture.",
            );
        }

        let prompt = build_prompt(request.profile_kind, &document.text);

        debug!(backend = self.primary.name(), "attempting primary backend");
        match self.attempt(self.primary.as_ref(), &prompt).await {
            AttemptOutcome::Adopted(profile, response) => {
                OrchestrationResult::adopted(*profile, response)
            }
            AttemptOutcome::Unusable(response) => OrchestrationResult::unusable(response),
            AttemptOutcome::Failed(error) if error.is_transient() => {
                if self.config.race_fallback_enabled {
                    self.race(&prompt, error).await
                } else {
                    OrchestrationResult::backend_failure(&error)
                }
            }
            AttemptOutcome::Failed(error) => OrchestrationResult::backend_failure(&error),
        }
    }

    /// One backend call followed by repair and gate validation.
    async fn attempt(
        &self,
        backend: &dyn ProfileBackend,
        prompt: &ExtractionPrompt,
    ) -> AttemptOutcome {
        match backend.extract(prompt).await {
            Ok(response) => match repair_and_validate(&response.raw_text) {
                RepairVerdict::Valid(profile) => {
                    info!(
                        backend = backend.name(),
                        model = %response.model,
                        elapsed_ms = response.elapsed_ms,
                        "adopted validated profile"
                    );
                    AttemptOutcome::Adopted(profile, response)
                }
                RepairVerdict::GateFailed(_) | RepairVerdict::Unparseable => {
                    AttemptOutcome::Unusable(response)
                }
            },
            Err(error) => {
                warn!(
                    backend = backend.name(),
                    error = %error,
                    transient = error.is_transient(),
                    "backend attempt failed"
                );
                AttemptOutcome::Failed(error)
            }
        }
    }

    /// Race a primary retry against the secondary. First validated profile
    /// wins; a same-tick tie goes to the primary. The loser's in-flight call
    /// is dropped and its result is never observed.
    async fn race(
        &self,
        prompt: &ExtractionPrompt,
        prior: BackendError,
    ) -> OrchestrationResult {
        info!(
            primary = self.primary.name(),
            secondary = self.secondary.name(),
            "primary failed transiently, racing retry against secondary"
        );

        let primary_fut = self.attempt(self.primary.as_ref(), prompt);
        let secondary_fut = self.attempt(self.secondary.as_ref(), prompt);
        tokio::pin!(primary_fut);
        tokio::pin!(secondary_fut);

        let (first, second) = tokio::select! {
            // Polled in order, so a tie resolves to the primary.
            biased;
            outcome = &mut primary_fut => {
                if let AttemptOutcome::Adopted(profile, response) = outcome {
                    return OrchestrationResult::adopted(*profile, response);
                }
                (outcome, secondary_fut.await)
            }
            outcome = &mut secondary_fut => {
                if let AttemptOutcome::Adopted(profile, response) = outcome {
                    return OrchestrationResult::adopted(*profile, response);
                }
                (outcome, primary_fut.await)
            }
        };

        if let AttemptOutcome::Adopted(profile, response) = second {
            return OrchestrationResult::adopted(*profile, response);
        }

        warn!("both race branches failed");
        Self::fold_failures(prior, first, second)
    }

    /// Collapse two failed race branches into one result, preferring the
    /// most specific signal: the last transient transport error, then any
    /// fatal transport error, then an unusable-response verdict.
    fn fold_failures(
        prior: BackendError,
        first: AttemptOutcome,
        second: AttemptOutcome,
    ) -> OrchestrationResult {
        let mut transient: Option<BackendError> = None;
        let mut fatal: Option<BackendError> = None;
        let mut unusable: Option<BackendResponse> = None;

        for outcome in [first, second] {
            match outcome {
                AttemptOutcome::Failed(error) if error.is_transient() => {
                    transient = Some(error);
                }
                AttemptOutcome::Failed(error) => fatal = Some(error),
                AttemptOutcome::Unusable(response) => unusable = Some(response),
                AttemptOutcome::Adopted(..) => {}
            }
        }

        if let Some(error) = fatal {
            return OrchestrationResult::backend_failure(&error);
        }
        if let Some(error) = transient {
            return OrchestrationResult::backend_failure(&error);
        }
        if let Some(response) = unusable {
            return OrchestrationResult::unusable(response);
        }
        OrchestrationResult::backend_failure(&prior)
    }
}
