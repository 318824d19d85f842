//! Resilient transport: escalating-timeout retry for backend calls.
//!
//! Backends are slow and fail transiently (timeouts, 429, 5xx). A call is
//! attempted under a first, tighter budget; on transient failure it is retried
//! under progressively larger budgets. Non-transient failures are returned
//! immediately, since retrying a rejected request guarantees a second
//! rejection.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{LlmError, Result};

/// Escalating per-attempt timeout budgets.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    budgets: Vec<Duration>,
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self {
            budgets: vec![Duration::from_secs(45), Duration::from_secs(90)],
        }
    }
}

impl RetrySchedule {
    /// Create a schedule from explicit budgets. An empty list falls back to
    /// the default schedule.
    pub fn new(budgets: Vec<Duration>) -> Self {
        if budgets.is_empty() {
            Self::default()
        } else {
            Self { budgets }
        }
    }

    /// Create a schedule from millisecond values.
    pub fn from_millis(millis: &[u64]) -> Self {
        Self::new(millis.iter().map(|ms| Duration::from_millis(*ms)).collect())
    }

    /// A schedule with a single attempt and no retry.
    pub fn single(budget: Duration) -> Self {
        Self {
            budgets: vec![budget],
        }
    }

    /// Number of attempts this schedule allows.
    pub fn attempts(&self) -> usize {
        self.budgets.len()
    }

    /// Budget for the given zero-based attempt; clamped to the last entry.
    pub fn budget(&self, attempt: usize) -> Duration {
        self.budgets
            .get(attempt)
            .or_else(|| self.budgets.last())
            .copied()
            .unwrap_or(Duration::from_secs(45))
    }
}

/// Run `op` under the schedule, retrying only transient failures.
///
/// `op` receives the zero-based attempt number and that attempt's timeout
/// budget. The last error is returned once the schedule is exhausted.
pub async fn with_retries<T, F, Fut>(schedule: &RetrySchedule, mut op: F) -> Result<T>
where
    F: FnMut(usize, Duration) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = schedule.attempts();
    let mut last_err = None;

    for attempt in 0..attempts {
        let budget = schedule.budget(attempt);
        match op(attempt, budget).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt + 1 < attempts => {
                warn!(
                    attempt,
                    budget_ms = budget.as_millis() as u64,
                    error = %e,
                    "transient backend failure, retrying under larger budget"
                );
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| LlmError::Config("empty retry schedule".into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_schedule_escalates_and_clamps() {
        let schedule = RetrySchedule::from_millis(&[1_000, 5_000]);
        assert_eq!(schedule.attempts(), 2);
        assert_eq!(schedule.budget(0), Duration::from_millis(1_000));
        assert_eq!(schedule.budget(1), Duration::from_millis(5_000));
        assert_eq!(schedule.budget(7), Duration::from_millis(5_000));
    }

    #[test]
    fn test_empty_schedule_falls_back_to_default() {
        let schedule = RetrySchedule::new(vec![]);
        assert_eq!(schedule.attempts(), 2);
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let calls = Arc::new(AtomicUsize::new(0));
        let schedule = RetrySchedule::from_millis(&[10, 20]);

        let counted = calls.clone();
        let result = with_retries(&schedule, |attempt, budget| {
            let counted = counted.clone();
            async move {
                counted.fetch_add(1, Ordering::SeqCst);
                if attempt == 0 {
                    assert_eq!(budget, Duration::from_millis(10));
                    Err(LlmError::Api {
                        status: 503,
                        message: "overloaded".into(),
                    })
                } else {
                    assert_eq!(budget, Duration::from_millis(20));
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fatal_error_stops_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let schedule = RetrySchedule::from_millis(&[10, 20]);

        let counted = calls.clone();
        let result: Result<()> = with_retries(&schedule, |_, _| {
            let counted = counted.clone();
            async move {
                counted.fetch_add(1, Ordering::SeqCst);
                Err(LlmError::Api {
                    status: 401,
                    message: "bad key".into(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(LlmError::Api { status: 401, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausted_schedule_returns_last_error() {
        let schedule = RetrySchedule::from_millis(&[10, 20]);

        let result: Result<()> = with_retries(&schedule, |attempt, _| async move {
            Err(LlmError::Api {
                status: 500 + attempt as u16,
                message: "boom".into(),
            })
        })
        .await;

        // Last attempt's error, not the first one
        assert!(matches!(result, Err(LlmError::Api { status: 501, .. })));
    }
}
