//! Retry classification and jittered exponential backoff
//!
//! Transient failures (resets, timeouts, refused connections, 5xx-class
//! statuses, aborted transfers) are retried against a per-size-class
//! budget. Definitive answers - including the whole 4xx client range -
//! are never retried.

use std::future::Future;
use std::time::{Duration, Instant};

use rand::Rng;
use reqwest::StatusCode;

use crate::config::RetryBudget;
use crate::error::{Result, StoreError};

use super::FetchStats;

/// Outcome of one fetch attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Definitive result: body bytes or a confirmed absence
    Done(Option<Vec<u8>>),

    /// Matches a transient signature; worth retrying if budget remains
    Transient(String),

    /// Malformed request or other non-transient failure; give up now
    Fatal(String),
}

pub fn retryable_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Connection-level signatures: timeout, refused/reset, aborted transfer
pub fn retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_body()
}

/// Exponential backoff with random jitter, clamped to the budget's
/// [initial_delay, max_delay] bounds. `attempt` is 1-based.
pub fn backoff_delay(budget: &RetryBudget, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1).min(16));
    let base = budget.initial_delay.saturating_mul(factor).min(budget.max_delay);

    let jitter_ms = base.as_millis() as u64 / 2;
    let jitter = if jitter_ms == 0 {
        Duration::ZERO
    } else {
        Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    };

    (base + jitter).min(budget.max_delay).max(budget.initial_delay)
}

/// Drive `attempt_fn` until it returns a definitive outcome or the
/// budget runs out. A `Transient` on the final attempt and any `Fatal`
/// surface as [`StoreError::TransportExhausted`] with full diagnostics.
pub async fn retry_loop<F, Fut>(
    path: &str,
    budget: RetryBudget,
    stats: &FetchStats,
    mut attempt_fn: F,
) -> Result<Option<Vec<u8>>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AttemptOutcome>,
{
    let started = Instant::now();
    let mut attempt = 1u32;

    loop {
        match attempt_fn().await {
            AttemptOutcome::Done(body) => {
                if body.is_none() {
                    stats.record_absence();
                    tracing::debug!(path, "resource absent");
                }
                return Ok(body);
            }
            AttemptOutcome::Transient(reason) if attempt < budget.max_attempts => {
                stats.record_retry();
                let delay = backoff_delay(&budget, attempt);
                tracing::warn!(
                    path,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    reason = %reason,
                    "transient fetch failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            AttemptOutcome::Transient(reason) | AttemptOutcome::Fatal(reason) => {
                stats.record_failure();
                return Err(StoreError::TransportExhausted {
                    path: path.to_string(),
                    attempts: attempt,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                    last_error: reason,
                });
            }
        }
    }
}
