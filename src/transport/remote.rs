//! Remote blob store backend over HTTP
//!
//! One logical fetch = gate slot + retry loop. The gate slot is held
//! across retries so a saturated store is not hammered by backoff
//! traffic from many callers at once.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::config::RetryPolicy;
use crate::error::{Result, StoreError};

use super::retry::{self, AttemptOutcome};
use super::{FetchBackend, FetchGate, FetchStats, FetchStatsSnapshot, SizeClass};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RemoteBackend {
    http: Client,
    base_url: Url,
    gate: FetchGate,
    retry: RetryPolicy,
    stats: FetchStats,
}

impl RemoteBackend {
    pub fn new(base_url: Url, concurrency: usize, retry: RetryPolicy) -> Result<Self> {
        let mut base_url = base_url;
        // Url::join drops the last path segment without this
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        tracing::info!(base = %base_url, concurrency, "remote reference backend ready");
        Ok(Self {
            http,
            base_url,
            gate: FetchGate::new(concurrency),
            retry,
            stats: FetchStats::default(),
        })
    }

    pub fn stats(&self) -> FetchStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn gate(&self) -> &FetchGate {
        &self.gate
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| StoreError::InvalidConfig(format!("invalid resource path {path}: {e}")))
    }

    async fn attempt(&self, url: &Url) -> AttemptOutcome {
        let response = match self.http.get(url.clone()).send().await {
            Ok(response) => response,
            Err(err) if retry::retryable_error(&err) => {
                return AttemptOutcome::Transient(err.to_string())
            }
            Err(err) => return AttemptOutcome::Fatal(err.to_string()),
        };

        let status = response.status();
        if status.is_success() {
            match response.bytes().await {
                Ok(bytes) => AttemptOutcome::Done(Some(bytes.to_vec())),
                Err(err) => AttemptOutcome::Transient(format!("aborted transfer: {err}")),
            }
        } else if retry::retryable_status(status) {
            AttemptOutcome::Transient(format!("status {status}"))
        } else {
            // Client-error class: a definitive answer, never retried
            AttemptOutcome::Done(None)
        }
    }
}

#[async_trait]
impl FetchBackend for RemoteBackend {
    async fn fetch(&self, path: &str, class: SizeClass) -> Result<Option<Vec<u8>>> {
        let url = self.join(path)?;
        let budget = match class {
            SizeClass::Small => self.retry.small,
            SizeClass::Large => self.retry.large,
        };

        let _permit = self.gate.acquire().await?;
        self.stats.record_request();
        retry::retry_loop(path, budget, &self.stats, || self.attempt(&url)).await
    }
}
