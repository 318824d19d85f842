//! End-to-end orchestrator behavior over scripted backends.

use std::sync::Arc;
use std::time::Duration;

use profile_extraction::testing::{sample_profile_json, MockBackend};
use profile_extraction::{ExtractionRequest, ExtractorConfig, Orchestrator};

const PAGE: &str = "<html><body><main>Ada Lovelace, Engineer at Analytical Engines</main></body></html>";

fn request() -> ExtractionRequest {
    ExtractionRequest::new(PAGE, "https://example.com/in/ada")
}

#[tokio::test]
async fn secondary_adopted_when_primary_keeps_timing_out() {
    let primary = Arc::new(MockBackend::new("primary").then_timeout());
    let secondary = Arc::new(
        MockBackend::new("secondary")
            .then_reply(sample_profile_json())
            .with_model("thorough-model"),
    );
    let orchestrator = Orchestrator::new(
        primary.clone(),
        secondary.clone(),
        ExtractorConfig::default(),
    );

    let result = orchestrator.run(&request()).await;

    assert!(result.success);
    assert_eq!(result.provider.as_deref(), Some("secondary"));
    assert_eq!(result.model.as_deref(), Some("thorough-model"));
    assert!(result.data.unwrap().meets_acceptance_gate());
    // Initial attempt plus the race retry.
    assert_eq!(primary.call_count(), 2);
    assert_eq!(secondary.call_count(), 1);
}

#[tokio::test]
async fn both_transient_failures_report_transient() {
    let primary = Arc::new(MockBackend::new("primary").then_timeout());
    let secondary = Arc::new(MockBackend::new("secondary").then_http(429));
    let orchestrator =
        Orchestrator::new(primary, secondary, ExtractorConfig::default());

    let result = orchestrator.run(&request()).await;

    assert!(!result.success);
    assert!(result.transient);
    assert!(result.user_message.is_some());
}

#[tokio::test]
async fn fatal_primary_status_skips_the_race() {
    let primary = Arc::new(MockBackend::new("primary").then_http(401));
    let secondary = Arc::new(MockBackend::new("secondary"));
    let orchestrator = Orchestrator::new(
        primary.clone(),
        secondary.clone(),
        ExtractorConfig::default(),
    );

    let result = orchestrator.run(&request()).await;

    assert!(!result.success);
    assert!(!result.transient);
    assert_eq!(result.http_status_hint, 401);
    assert_eq!(primary.call_count(), 1);
    assert_eq!(secondary.call_count(), 0);
}

#[tokio::test]
async fn oversized_page_never_reaches_a_backend() {
    let primary = Arc::new(MockBackend::new("primary"));
    let secondary = Arc::new(MockBackend::new("secondary"));
    let config = ExtractorConfig::default().with_max_html_kb(1);
    let orchestrator = Orchestrator::new(primary.clone(), secondary.clone(), config);

    let oversized = "x".repeat(2 * 1024);
    let result = orchestrator
        .run(&ExtractionRequest::new(oversized, "https://example.com/in/ada"))
        .await;

    assert!(!result.success);
    assert!(!result.transient);
    assert_eq!(result.http_status_hint, 413);
    assert_eq!(primary.call_count(), 0);
    assert_eq!(secondary.call_count(), 0);
}

#[tokio::test]
async fn disabled_race_fails_without_touching_the_secondary() {
    let primary = Arc::new(MockBackend::new("primary").then_timeout());
    let secondary = Arc::new(MockBackend::new("secondary"));
    let config = ExtractorConfig::default().with_race_fallback(false);
    let orchestrator = Orchestrator::new(primary.clone(), secondary.clone(), config);

    let result = orchestrator.run(&request()).await;

    assert!(!result.success);
    assert!(result.transient);
    assert_eq!(primary.call_count(), 1);
    assert_eq!(secondary.call_count(), 0);
}

#[tokio::test]
async fn race_tie_is_biased_to_the_primary() {
    // After the initial timeout, both branches produce a validated profile
    // on their first poll; the primary must win the tie.
    let primary = Arc::new(
        MockBackend::new("primary")
            .then_timeout()
            .then_reply(sample_profile_json()),
    );
    let secondary = Arc::new(MockBackend::new("secondary").then_reply(sample_profile_json()));
    let orchestrator = Orchestrator::new(
        primary.clone(),
        secondary,
        ExtractorConfig::default(),
    );

    let result = orchestrator.run(&request()).await;

    assert!(result.success);
    assert_eq!(result.provider.as_deref(), Some("primary"));
    assert_eq!(primary.call_count(), 2);
}

#[tokio::test]
async fn slow_loser_is_discarded() {
    let primary = Arc::new(
        MockBackend::new("primary")
            .then_timeout()
            .then_reply(sample_profile_json()),
    );
    let secondary = Arc::new(
        MockBackend::new("secondary")
            .then_reply(sample_profile_json())
            .with_latency(Duration::from_millis(200)),
    );
    let orchestrator = Orchestrator::new(primary, secondary.clone(), ExtractorConfig::default());

    let result = orchestrator.run(&request()).await;

    assert!(result.success);
    assert_eq!(result.provider.as_deref(), Some("primary"));
}

#[tokio::test]
async fn gate_failure_is_fatal_not_raced() {
    // Parseable JSON that fails the acceptance gate: no name, no history.
    let primary = Arc::new(
        MockBackend::new("primary").then_reply(r#"{"profile": {"headline": "Engineer"}}"#),
    );
    let secondary = Arc::new(MockBackend::new("secondary"));
    let orchestrator = Orchestrator::new(
        primary.clone(),
        secondary.clone(),
        ExtractorConfig::default(),
    );

    let result = orchestrator.run(&request()).await;

    assert!(!result.success);
    assert!(!result.transient);
    assert_eq!(result.http_status_hint, 502);
    assert!(result.raw_response.is_some());
    assert_eq!(secondary.call_count(), 0);
}

#[tokio::test]
async fn adopted_result_propagates_usage_and_provider() {
    let primary = Arc::new(MockBackend::new("primary").then_reply(sample_profile_json()));
    let secondary = Arc::new(MockBackend::new("secondary"));
    let orchestrator = Orchestrator::new(primary, secondary, ExtractorConfig::default());

    let result = orchestrator.run(&request()).await;

    assert!(result.success);
    let usage = result.usage.expect("usage propagated");
    assert_eq!(usage.input_tokens, Some(1_000));
    assert_eq!(usage.total_tokens, Some(1_150));
    assert!(usage.request_id.is_some());

    let profile = result.data.expect("profile adopted");
    assert_eq!(profile.profile.name, "Ada Lovelace");
}
