//! Credit-ledger seam.
//!
//! Extraction costs credits. The caller places a hold before running the
//! orchestrator and settles it afterwards; the orchestration core itself
//! never touches the ledger, so a ledger outage cannot strand an extraction
//! mid-flight. The trait lives here so callers and tests share one seam.

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::types::OrchestrationResult;

/// Opaque handle to a placed hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HoldToken(pub String);

impl HoldToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

/// Reserves, commits, and releases extraction credits.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Reserve `cost` credits against an account. Fails when the balance is
    /// too low; a successful hold guarantees the later commit cannot fail
    /// for lack of funds.
    async fn hold(&self, account_id: &str, cost: u32) -> Result<HoldToken, LedgerError>;

    /// Consume a held reservation.
    async fn commit(&self, hold: HoldToken) -> Result<(), LedgerError>;

    /// Return a held reservation to the account.
    async fn release(&self, hold: HoldToken, reason: &str) -> Result<(), LedgerError>;
}

/// Settle a hold against an orchestration outcome: commit on success,
/// release on any failure. Rejected and failed runs never cost credits.
pub async fn settle_hold(
    ledger: &dyn CreditLedger,
    hold: HoldToken,
    result: &OrchestrationResult,
) -> Result<(), LedgerError> {
    if result.success {
        ledger.commit(hold).await
    } else {
        let reason = result
            .user_message
            .as_deref()
            .unwrap_or("extraction failed");
        ledger.release(hold, reason).await
    }
}
