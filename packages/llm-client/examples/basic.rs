//! Basic chat completion example.
//!
//! Run with: EXTRACTION_API_KEY=sk-... cargo run --example basic

use std::time::Duration;

use llm_client::{ChatRequest, LlmClient, Message};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = LlmClient::from_env("EXTRACTION_API_KEY")?;

    let request = ChatRequest::new("gpt-4o-mini")
        .message(Message::system("You are a terse assistant."))
        .message(Message::user("Say hello in five words or fewer."));

    let exchange = client
        .chat_completion(&request, Duration::from_secs(45))
        .await?;

    println!("status: {}", exchange.status);
    println!("text:   {}", exchange.body.text().unwrap_or("<no content>"));
    Ok(())
}
