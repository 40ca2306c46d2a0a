//! Reference store facade and readers
//!
//! [`ReferenceStore`] owns one fetch backend (chosen once, at
//! construction - the environment switch) plus the cache tiers. Every
//! reader is a method on the facade taking plain identifiers and
//! returning the entity, `None`, or an empty collection; only
//! exhausted-retry transport failures surface as errors.

mod catalog;
mod changelog;
mod lookup;
mod manifest;
pub mod paths;
mod pointer;
mod routing;


pub use routing::EagerPolicy;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::cache::{MemoryCache, PersistentCache};
use crate::config::{CacheWindows, StoreConfig, StoreMode};
use crate::error::Result;
use crate::transport::{FetchBackend, LocalBackend, RemoteBackend, SizeClass};

pub struct ReferenceStore {
    backend: Arc<dyn FetchBackend>,
    memory: MemoryCache,
    persistent: Option<PersistentCache>,
    windows: CacheWindows,
}

impl ReferenceStore {
    /// Build from explicit configuration. This is the one place the
    /// local-vs-remote decision runs; readers never re-examine it.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        let backend: Arc<dyn FetchBackend> = match &config.mode {
            StoreMode::Local { root } => Arc::new(LocalBackend::new(root.clone())),
            StoreMode::Remote { base_url } => Arc::new(RemoteBackend::new(
                base_url.clone(),
                config.concurrency,
                config.retry,
            )?),
        };

        let persistent = match &config.cache_dir {
            Some(dir) => Some(PersistentCache::open(dir.clone())?),
            None => None,
        };

        Ok(Self {
            backend,
            memory: MemoryCache::default(),
            persistent,
            windows: config.windows,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::with_config(StoreConfig::from_env()?)
    }

    /// Wrap an existing backend; used by tests and embedders with their
    /// own transport.
    pub fn with_backend(backend: Arc<dyn FetchBackend>) -> Self {
        Self {
            backend,
            memory: MemoryCache::default(),
            persistent: None,
            windows: CacheWindows::default(),
        }
    }

    pub fn with_windows(mut self, windows: CacheWindows) -> Self {
        self.windows = windows;
        self
    }

    pub fn windows(&self) -> CacheWindows {
        self.windows
    }

    pub(crate) fn memory(&self) -> &MemoryCache {
        &self.memory
    }

    /// Small resource via persistent tier (long window) then backend
    pub(crate) async fn fetch_small(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.fetch_small_windowed(path, self.windows.small).await
    }

    pub(crate) async fn fetch_small_windowed(
        &self,
        path: &str,
        window: Duration,
    ) -> Result<Option<Vec<u8>>> {
        if let Some(cache) = &self.persistent {
            if let Some(bytes) = cache.get(path, window) {
                return Ok(Some(bytes));
            }
        }

        let fetched = self.backend.fetch(path, SizeClass::Small).await?;
        if let (Some(cache), Some(bytes)) = (&self.persistent, fetched.as_deref()) {
            cache.put(path, bytes);
        }
        Ok(fetched)
    }

    /// Small resource that skips the persistent tier (bulky per-shard
    /// payloads: catalog shards, changelog shards, individual symbols)
    pub(crate) async fn fetch_small_transient(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.backend.fetch(path, SizeClass::Small).await
    }

    /// Large resources always bypass the persistent tier
    pub(crate) async fn fetch_large(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.backend.fetch(path, SizeClass::Large).await
    }

    /// Data-shape failures are absences for resilience, but logged
    /// distinctly: they mean a producer/consumer schema mismatch, not a
    /// missing resource.
    pub(crate) fn parse<T: DeserializeOwned>(path: &str, bytes: &[u8]) -> Option<T> {
        match serde_json::from_slice(bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(path, %err, "malformed reference payload, treating as absent");
                None
            }
        }
    }
}
