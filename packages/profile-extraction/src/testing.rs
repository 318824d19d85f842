//! Test doubles for the extraction core.
//!
//! Handwritten mocks with scripted outcomes and call recording. Kept in the
//! library (not a `tests/` helper module) so downstream crates can drive the
//! orchestrator in their own tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::backends::ProfileBackend;
use crate::error::{BackendError, BackendResult, LedgerError};
use crate::ledger::{CreditLedger, HoldToken};
use crate::prompts::ExtractionPrompt;
use crate::types::{BackendResponse, UsageRecord};

/// A raw completion that passes the acceptance gate.
pub fn sample_profile_json() -> String {
    r#"{
        "profile": {"name": "Ada Lovelace", "headline": "Engineer"},
        "experience": [{"title": "Engineer", "company": "Analytical Engines"}],
        "education": [],
        "skills": ["mathematics"]
    }"#
    .to_string()
}

/// One scripted backend outcome.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Return this raw completion text with HTTP 200
    Reply(String),
    /// Fail with a timeout
    Timeout,
    /// Fail with this HTTP status
    Http(u16),
    /// Fail at the network level
    Network,
}

/// Scriptable `ProfileBackend` with call recording.
///
/// Outcomes are consumed front-to-back; when the script runs out the last
/// configured outcome repeats, so a "primary always times out" backend is
/// just `MockBackend::new("primary").then_timeout()`.
pub struct MockBackend {
    name: String,
    model: String,
    latency: Duration,
    script: Mutex<VecDeque<ScriptedOutcome>>,
    last: Mutex<Option<ScriptedOutcome>>,
    calls: Mutex<Vec<ExtractionPrompt>>,
}

impl MockBackend {
    /// Create a mock with an empty script. With no outcomes configured it
    /// replies with `sample_profile_json`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: "mock-model".to_string(),
            latency: Duration::ZERO,
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Append a successful reply to the script.
    pub fn then_reply(self, raw_text: impl Into<String>) -> Self {
        self.push(ScriptedOutcome::Reply(raw_text.into()))
    }

    /// Append a timeout to the script.
    pub fn then_timeout(self) -> Self {
        self.push(ScriptedOutcome::Timeout)
    }

    /// Append an HTTP failure to the script.
    pub fn then_http(self, status: u16) -> Self {
        self.push(ScriptedOutcome::Http(status))
    }

    /// Append a network failure to the script.
    pub fn then_network_error(self) -> Self {
        self.push(ScriptedOutcome::Network)
    }

    /// Delay every call by this much, for ordering-sensitive race tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Override the reported model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock poisoned").len()
    }

    /// Prompts received, in call order.
    pub fn recorded_prompts(&self) -> Vec<ExtractionPrompt> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    fn push(self, outcome: ScriptedOutcome) -> Self {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(outcome.clone());
        *self.last.lock().expect("last lock poisoned") = Some(outcome);
        self
    }

    fn next_outcome(&self) -> ScriptedOutcome {
        if let Some(outcome) = self.script.lock().expect("script lock poisoned").pop_front() {
            return outcome;
        }
        self.last
            .lock()
            .expect("last lock poisoned")
            .clone()
            .unwrap_or_else(|| ScriptedOutcome::Reply(sample_profile_json()))
    }
}

#[async_trait]
impl ProfileBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn extract(&self, prompt: &ExtractionPrompt) -> BackendResult<BackendResponse> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(prompt.clone());

        if self.latency > Duration::ZERO {
            tokio::time::sleep(self.latency).await;
        }

        match self.next_outcome() {
            ScriptedOutcome::Reply(raw_text) => Ok(BackendResponse {
                backend: self.name.clone(),
                model: self.model.clone(),
                raw_text,
                usage: UsageRecord {
                    input_tokens: Some(1_000),
                    output_tokens: Some(150),
                    total_tokens: Some(1_150),
                    request_id: Some(format!("mock-{}", self.call_count())),
                },
                http_status: Some(200),
                elapsed_ms: self.latency.as_millis() as u64,
            }),
            ScriptedOutcome::Timeout => Err(BackendError::Timeout(Duration::from_secs(45))),
            ScriptedOutcome::Http(status) => Err(BackendError::Http {
                status,
                message: "scripted failure".into(),
            }),
            ScriptedOutcome::Network => Err(BackendError::Network("scripted failure".into())),
        }
    }
}

/// In-memory `CreditLedger` for callers' tests.
pub struct MemoryLedger {
    balances: Mutex<HashMap<String, u32>>,
    holds: Mutex<HashMap<HoldToken, (String, u32)>>,
    next_hold: AtomicU64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            holds: Mutex::new(HashMap::new()),
            next_hold: AtomicU64::new(1),
        }
    }

    /// Create a ledger with one funded account.
    pub fn with_balance(account_id: impl Into<String>, balance: u32) -> Self {
        let ledger = Self::new();
        ledger
            .balances
            .lock()
            .expect("balances lock poisoned")
            .insert(account_id.into(), balance);
        ledger
    }

    /// Available (unheld) balance for an account.
    pub fn balance(&self, account_id: &str) -> u32 {
        self.balances
            .lock()
            .expect("balances lock poisoned")
            .get(account_id)
            .copied()
            .unwrap_or(0)
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CreditLedger for MemoryLedger {
    async fn hold(&self, account_id: &str, cost: u32) -> Result<HoldToken, LedgerError> {
        let mut balances = self.balances.lock().expect("balances lock poisoned");
        let balance = balances.get(account_id).copied().unwrap_or(0);
        if balance < cost {
            return Err(LedgerError::InsufficientBalance {
                account_id: account_id.to_string(),
            });
        }
        balances.insert(account_id.to_string(), balance - cost);

        let token = HoldToken::new(format!(
            "hold-{}",
            self.next_hold.fetch_add(1, Ordering::Relaxed)
        ));
        self.holds
            .lock()
            .expect("holds lock poisoned")
            .insert(token.clone(), (account_id.to_string(), cost));
        Ok(token)
    }

    async fn commit(&self, hold: HoldToken) -> Result<(), LedgerError> {
        self.holds
            .lock()
            .expect("holds lock poisoned")
            .remove(&hold)
            .map(|_| ())
            .ok_or(LedgerError::UnknownHold(hold.0))
    }

    async fn release(&self, hold: HoldToken, _reason: &str) -> Result<(), LedgerError> {
        let (account_id, cost) = self
            .holds
            .lock()
            .expect("holds lock poisoned")
            .remove(&hold)
            .ok_or_else(|| LedgerError::UnknownHold(hold.0.clone()))?;

        let mut balances = self.balances.lock().expect("balances lock poisoned");
        let balance = balances.get(&account_id).copied().unwrap_or(0);
        balances.insert(account_id, balance + cost);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::build_prompt;
    use crate::types::ProfileKind;

    #[tokio::test]
    async fn test_mock_script_consumed_in_order() {
        let backend = MockBackend::new("primary")
            .then_timeout()
            .then_reply("{\"ok\":1}");
        let prompt = build_prompt(ProfileKind::Own, "<html></html>");

        assert!(backend.extract(&prompt).await.is_err());
        let response = backend.extract(&prompt).await.unwrap();
        assert_eq!(response.raw_text, "{\"ok\":1}");
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_repeats_last_outcome() {
        let backend = MockBackend::new("primary").then_http(429);
        let prompt = build_prompt(ProfileKind::Target, "<html></html>");

        for _ in 0..3 {
            let err = backend.extract(&prompt).await.unwrap_err();
            assert_eq!(err.status(), Some(429));
        }
    }

    #[tokio::test]
    async fn test_unscripted_mock_replies_with_valid_profile() {
        let backend = MockBackend::new("primary");
        let prompt = build_prompt(ProfileKind::Own, "<html></html>");

        let response = backend.extract(&prompt).await.unwrap();
        assert!(response.raw_text.contains("Ada Lovelace"));
    }
}
