//! Bounded concurrency gate for in-flight fetches
//!
//! The remote store rate-limits and resets connections under high
//! parallel fan-out (common during bulk static generation), so at most
//! `limit` fetches run at once per backend. Excess callers queue in
//! FIFO order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{Result, StoreError};

/// Queue waits above this are logged for diagnosing saturation
const CONTENTION_LOG_THRESHOLD: Duration = Duration::from_millis(50);

pub struct FetchGate {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl FetchGate {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a free slot. Tokio semaphores queue waiters FIFO, so
    /// callers are released in arrival order as slots free up.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        let started = Instant::now();
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| StoreError::Gate("fetch gate closed".into()))?;

        let waited = started.elapsed();
        if waited > CONTENTION_LOG_THRESHOLD {
            tracing::debug!(waited_ms = waited.as_millis() as u64, "fetch slot contended");
        }
        Ok(permit)
    }
}
