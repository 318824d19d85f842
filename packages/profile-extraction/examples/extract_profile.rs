//! Extract a profile from a saved HTML capture.
//!
//! Reads a file path from argv, runs the full orchestration (preprocess,
//! primary attempt, race fallback), and prints the outcome as JSON.
//!
//! ```bash
//! PRIMARY_API_KEY=sk-... SECONDARY_API_KEY=sk-... \
//!     cargo run --example extract_profile -- capture.html
//! ```

use llm_client::LlmClient;
use profile_extraction::{ExtractionRequest, ExtractorConfig, Orchestrator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "profile_extraction=debug,llm_client=debug".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: extract_profile <capture.html>")?;
    let html = std::fs::read_to_string(&path)?;

    let config = ExtractorConfig::from_env()?;
    let primary = LlmClient::from_env("PRIMARY_API_KEY")?;
    let secondary = LlmClient::from_env("SECONDARY_API_KEY")?;
    let orchestrator = Orchestrator::from_clients(primary, secondary, config);

    let request = ExtractionRequest::new(html, format!("file://{path}"));
    let result = orchestrator.run(&request).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
