//! Fetch transport - the only component performing raw network/file I/O
//!
//! Higher layers funnel every read through [`FetchBackend`]; the remote
//! implementation adds retry-with-backoff and a bounded concurrency
//! gate, the local one mirrors the blob store layout on disk. Both
//! produce structurally identical output for the same logical path.

pub mod gate;
pub mod local;
pub mod remote;
pub mod retry;

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::error::Result;

pub use gate::FetchGate;
pub use local::LocalBackend;
pub use remote::RemoteBackend;

/// Classification hint for one logical fetch, used only to choose
/// retry budgets and cache treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Large,
}

/// Capability interface over the two I/O substrates
///
/// `Ok(None)` is a definitive absence (missing file, HTTP 4xx class) and
/// is never retried. Errors mean the transport gave up after its budget.
#[async_trait]
pub trait FetchBackend: Send + Sync {
    async fn fetch(&self, path: &str, class: SizeClass) -> Result<Option<Vec<u8>>>;
}

/// Fetch counters owned by a backend instance, never process-global,
/// so tests construct independent backends without interference.
#[derive(Debug, Default)]
pub struct FetchStats {
    requests: AtomicU64,
    retries: AtomicU64,
    absences: AtomicU64,
    failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchStatsSnapshot {
    pub requests: u64,
    pub retries: u64,
    pub absences: u64,
    pub failures: u64,
}

impl FetchStats {
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_absence(&self) {
        self.absences.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FetchStatsSnapshot {
        FetchStatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            absences: self.absences.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
