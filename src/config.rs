//! Environment configuration and project registry
//!
//! Leaf module: nothing here depends back on the data-access layer, so
//! the resolver can consume project configuration without a cycle.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{Result, StoreError};

pub const ENV_BASE_URL: &str = "REFSTORE_BASE_URL";
pub const ENV_LOCAL_ROOT: &str = "REFSTORE_LOCAL_ROOT";
pub const ENV_FORCE_LOCAL: &str = "REFSTORE_FORCE_LOCAL";
pub const ENV_DEPLOYED: &str = "REFSTORE_DEPLOYED";
pub const ENV_CONCURRENCY: &str = "REFSTORE_FETCH_CONCURRENCY";
pub const ENV_CACHE_DIR: &str = "REFSTORE_CACHE_DIR";

/// The remote store resets connections under high parallel fan-out,
/// so the default stays small.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 3;

pub const DEFAULT_LOCAL_ROOT: &str = "./reference-data";

/// Which I/O substrate the store reads from
#[derive(Debug, Clone)]
pub enum StoreMode {
    Local { root: PathBuf },
    Remote { base_url: Url },
}

/// Attempt budget and backoff bounds for one size class
#[derive(Debug, Clone, Copy)]
pub struct RetryBudget {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

/// Per-size-class retry budgets
///
/// Large resources are more prone to transient failure under load and
/// get a bigger budget.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub small: RetryBudget,
    pub large: RetryBudget,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            small: RetryBudget {
                max_attempts: 3,
                initial_delay: Duration::from_millis(200),
                max_delay: Duration::from_secs(2),
            },
            large: RetryBudget {
                max_attempts: 5,
                initial_delay: Duration::from_millis(500),
                max_delay: Duration::from_secs(8),
            },
        }
    }
}

/// Revalidation windows for the cache tiers
#[derive(Debug, Clone, Copy)]
pub struct CacheWindows {
    /// Small resources: manifests, routing tables, lookup shards, catalog indices
    pub small: Duration,

    /// Pointers revalidate fast so a newly published build becomes visible
    pub pointer: Duration,

    /// Cross-package language maps, rebuilt wholesale on expiry
    pub resolver: Duration,
}

impl Default for CacheWindows {
    fn default() -> Self {
        Self {
            small: Duration::from_secs(3600),
            pointer: Duration::from_secs(60),
            resolver: Duration::from_secs(1800),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub mode: StoreMode,
    pub concurrency: usize,
    pub cache_dir: Option<PathBuf>,
    pub windows: CacheWindows,
    pub retry: RetryPolicy,
}

impl StoreConfig {
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            mode: StoreMode::Local { root: root.into() },
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            cache_dir: None,
            windows: CacheWindows::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn remote(base_url: Url) -> Self {
        Self {
            mode: StoreMode::Remote { base_url },
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            cache_dir: None,
            windows: CacheWindows::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let mode = Self::resolve_mode()?;
        let concurrency = env::var(ENV_CONCURRENCY)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n >= 1)
            .unwrap_or(DEFAULT_FETCH_CONCURRENCY);
        let cache_dir = env::var(ENV_CACHE_DIR).ok().map(PathBuf::from);

        Ok(Self {
            mode,
            concurrency,
            cache_dir,
            windows: CacheWindows::default(),
            retry: RetryPolicy::default(),
        })
    }

    /// The single place that decides local vs. remote
    ///
    /// Force-local wins over everything: it is used to skip network
    /// fetches when the dataset was already synced to disk before a
    /// build step.
    fn resolve_mode() -> Result<StoreMode> {
        let force_local = flag(ENV_FORCE_LOCAL);
        let deployed = flag(ENV_DEPLOYED);

        if force_local || !deployed {
            let root = env::var(ENV_LOCAL_ROOT)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOCAL_ROOT));
            return Ok(StoreMode::Local { root });
        }

        let raw = env::var(ENV_BASE_URL).map_err(|_| {
            StoreError::InvalidConfig(format!(
                "{ENV_DEPLOYED} is set but {ENV_BASE_URL} is missing"
            ))
        })?;
        let base_url = Url::parse(&raw)
            .map_err(|e| StoreError::InvalidConfig(format!("{ENV_BASE_URL}={raw}: {e}")))?;
        Ok(StoreMode::Remote { base_url })
    }
}

fn flag(name: &str) -> bool {
    matches!(env::var(name).ok().as_deref(), Some("1") | Some("true"))
}

/// One enabled project the cross-package resolver aggregates over
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Package identifier used in resource paths (e.g. "langchain-core")
    pub package_id: String,

    /// Published name as installed by users (e.g. "langchain-core")
    pub published_name: String,

    pub language: String,
    pub ecosystem: String,
}

impl ProjectConfig {
    /// Module prefix the published package claims in qualified names
    /// ("langchain-core" publishes modules under "langchain_core")
    pub fn module_prefix(&self) -> String {
        self.published_name.replace('-', "_")
    }
}

/// All enabled projects, grouped by nothing - callers filter by language
#[derive(Debug, Clone, Default)]
pub struct ProjectRegistry {
    projects: Vec<ProjectConfig>,
}

impl ProjectRegistry {
    pub fn new(projects: Vec<ProjectConfig>) -> Self {
        Self { projects }
    }

    pub fn projects(&self) -> &[ProjectConfig] {
        &self.projects
    }

    pub fn for_language<'a>(&'a self, language: &'a str) -> impl Iterator<Item = &'a ProjectConfig> {
        self.projects.iter().filter(move |p| p.language == language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_prefix_maps_dashes() {
        let project = ProjectConfig {
            package_id: "langchain-core".into(),
            published_name: "langchain-core".into(),
            language: "python".into(),
            ecosystem: "python".into(),
        };
        assert_eq!(project.module_prefix(), "langchain_core");
    }

    #[test]
    fn test_registry_filters_by_language() {
        let registry = ProjectRegistry::new(vec![
            ProjectConfig {
                package_id: "langchain".into(),
                published_name: "langchain".into(),
                language: "python".into(),
                ecosystem: "python".into(),
            },
            ProjectConfig {
                package_id: "langchainjs".into(),
                published_name: "langchain".into(),
                language: "javascript".into(),
                ecosystem: "npm".into(),
            },
        ]);
        assert_eq!(registry.for_language("python").count(), 1);
        assert_eq!(registry.for_language("go").count(), 0);
    }

    #[test]
    fn test_retry_policy_defaults() {
        let policy = RetryPolicy::default();
        assert!(policy.large.max_attempts > policy.small.max_attempts);
        assert!(policy.small.initial_delay <= policy.small.max_delay);
    }

    // Env-dependent branches live in one test to avoid races between
    // parallel test threads sharing process environment.
    #[test]
    fn test_resolve_mode_from_env() {
        env::remove_var(ENV_FORCE_LOCAL);
        env::remove_var(ENV_DEPLOYED);
        env::remove_var(ENV_BASE_URL);
        env::set_var(ENV_LOCAL_ROOT, "/tmp/refdata");

        let config = StoreConfig::from_env().unwrap();
        assert!(matches!(config.mode, StoreMode::Local { ref root } if root == &PathBuf::from("/tmp/refdata")));

        env::set_var(ENV_DEPLOYED, "1");
        assert!(StoreConfig::from_env().is_err());

        env::set_var(ENV_BASE_URL, "https://blobs.example.com/reference/");
        let config = StoreConfig::from_env().unwrap();
        assert!(matches!(config.mode, StoreMode::Remote { .. }));

        // Force-local overrides a deployed-looking environment
        env::set_var(ENV_FORCE_LOCAL, "true");
        let config = StoreConfig::from_env().unwrap();
        assert!(matches!(config.mode, StoreMode::Local { .. }));

        env::remove_var(ENV_FORCE_LOCAL);
        env::remove_var(ENV_DEPLOYED);
        env::remove_var(ENV_BASE_URL);
        env::remove_var(ENV_LOCAL_ROOT);
    }
}
