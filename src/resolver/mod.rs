//! Cross-package resolver
//!
//! Decides whether a type name referenced inside package A's docs is
//! actually declared in a different package B of the same language
//! family, and returns B's canonical URL for it. Works off a
//! per-language map from module prefix to the package's linkable
//! symbols, aggregated from every enabled project's routing table and
//! rebuilt wholesale when the cache window expires.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::config::{ProjectConfig, ProjectRegistry};
use crate::error::Result;
use crate::store::ReferenceStore;

/// A resolved cross-package reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pub package_slug: String,
    pub url: String,
}

/// Linkable surface of one package within a language map
#[derive(Debug, Clone)]
struct PackageRecord {
    slug: String,
    /// bare type name -> url path fragment ("classes/BaseChatModel/")
    known_symbols: HashMap<String, String>,
}

/// Module prefix -> package record, ordered so the bare-name fallback
/// scan is deterministic
#[derive(Debug, Default)]
struct LanguageMap {
    packages: BTreeMap<String, PackageRecord>,
}

struct CachedMap {
    built_at: Instant,
    map: Arc<LanguageMap>,
}

pub struct CrossPackageResolver {
    store: Arc<ReferenceStore>,
    registry: ProjectRegistry,
    maps: Mutex<HashMap<String, CachedMap>>,
}

impl CrossPackageResolver {
    pub fn new(store: Arc<ReferenceStore>, registry: ProjectRegistry) -> Self {
        Self {
            store,
            registry,
            maps: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a type reference, qualified or bare
    ///
    /// Progressively longer prefixes (1, 2, then 3 segments) are tried
    /// against the prefix map; the first prefix that exists and whose
    /// package exposes the bare name wins. Nested module paths vary in
    /// depth across ecosystems, so neither a flat first-segment rule nor
    /// a single depth works for every package. References no rule
    /// matches stay unlinked - most identifiers in a signature are not
    /// cross-linkable types.
    pub async fn resolve(&self, language: &str, reference: &str) -> Result<Option<ResolvedLink>> {
        let map = self.language_map(language).await?;

        let segments: Vec<&str> = reference.split('.').filter(|s| !s.is_empty()).collect();
        let Some(&bare) = segments.last() else {
            return Ok(None);
        };

        if segments.len() > 1 {
            let max_depth = (segments.len() - 1).min(3);
            for depth in 1..=max_depth {
                let prefix = segments[..depth].join(".");
                if let Some(record) = map.packages.get(&prefix) {
                    if let Some(url_path) = record.known_symbols.get(bare) {
                        return Ok(Some(link(language, record, url_path)));
                    }
                }
            }
        }

        // Unprefixed (or foreign-prefixed) references: deterministic
        // scan in prefix order
        for record in map.packages.values() {
            if let Some(url_path) = record.known_symbols.get(bare) {
                return Ok(Some(link(language, record, url_path)));
            }
        }
        Ok(None)
    }

    async fn language_map(&self, language: &str) -> Result<Arc<LanguageMap>> {
        let window = self.store.windows().resolver;
        if let Some(cached) = self.maps.lock().unwrap().get(language) {
            if cached.built_at.elapsed() < window {
                return Ok(cached.map.clone());
            }
        }

        // Two callers racing past an expired entry both rebuild; the
        // maps are identical, so last-writer-wins is harmless.
        let map = Arc::new(self.build_language_map(language).await?);
        self.maps.lock().unwrap().insert(
            language.to_string(),
            CachedMap {
                built_at: Instant::now(),
                map: map.clone(),
            },
        );
        Ok(map)
    }

    async fn build_language_map(&self, language: &str) -> Result<LanguageMap> {
        let started = Instant::now();
        let mut map = LanguageMap::default();

        for project in self.registry.for_language(language) {
            match self.package_record(project).await? {
                Some(record) => {
                    map.packages.insert(project.module_prefix(), record);
                }
                None => {
                    // One unpublished package must not break links
                    // between the others
                    tracing::warn!(
                        package_id = %project.package_id,
                        language,
                        "skipping package without pointer or routing table"
                    );
                }
            }
        }

        tracing::info!(
            language,
            packages = map.packages.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built cross-package language map"
        );
        Ok(map)
    }

    async fn package_record(&self, project: &ProjectConfig) -> Result<Option<PackageRecord>> {
        let Some(pointer) = self
            .store
            .package_pointer(&project.ecosystem, &project.published_name)
            .await?
        else {
            return Ok(None);
        };

        let Some(table) = self
            .store
            .routing_table(&pointer.build_id, &project.language, &project.package_id)
            .await?
        else {
            return Ok(None);
        };

        let mut known_symbols = HashMap::new();
        for (slug, entry) in &table.slugs {
            if !entry.kind.is_linkable() {
                continue;
            }
            let bare = slug.rsplit('.').next().unwrap_or(slug);
            known_symbols.insert(
                bare.to_string(),
                format!("{}/{}/", entry.kind.url_segment(), bare),
            );
        }

        Ok(Some(PackageRecord {
            slug: table.package_id.clone(),
            known_symbols,
        }))
    }
}

fn link(language: &str, record: &PackageRecord, url_path: &str) -> ResolvedLink {
    ResolvedLink {
        package_slug: record.slug.clone(),
        url: format!("/{language}/{}/{url_path}", record.slug),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheWindows, StoreConfig};
    use crate::store::ReferenceStore;
    use serde_json::json;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_json(root: &Path, rel: &str, value: &serde_json::Value) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    }

    fn project(package_id: &str, published: &str) -> ProjectConfig {
        ProjectConfig {
            package_id: package_id.into(),
            published_name: published.into(),
            language: "python".into(),
            ecosystem: "python".into(),
        }
    }

    /// langchain-core exposes BaseChatModel; langchain exposes only
    /// AgentExecutor. Both are enabled python projects.
    fn fixture(root: &Path) {
        write_json(
            root,
            "pointers/packages/python/langchain-core.json",
            &json!({"buildId": "bld_core"}),
        );
        write_json(
            root,
            "pointers/packages/python/langchain.json",
            &json!({"buildId": "bld_main"}),
        );
        write_json(
            root,
            "bld_core/routing/python/langchain-core.json",
            &json!({
                "packageId": "langchain-core",
                "displayName": "langchain-core",
                "language": "python",
                "slugs": {
                    "langchain_core.language_models.BaseChatModel":
                        {"refId": "sym_core_1", "kind": "class", "pageType": "class", "title": "BaseChatModel"},
                    "langchain_core.runnables.run_helper":
                        {"refId": "sym_core_2", "kind": "function", "pageType": "function", "title": "run_helper"}
                }
            }),
        );
        write_json(
            root,
            "bld_main/routing/python/langchain.json",
            &json!({
                "packageId": "langchain",
                "displayName": "langchain",
                "language": "python",
                "slugs": {
                    "langchain.agents.AgentExecutor":
                        {"refId": "sym_main_1", "kind": "class", "pageType": "class", "title": "AgentExecutor"}
                }
            }),
        );
    }

    fn resolver_for(dir: &TempDir) -> CrossPackageResolver {
        fixture(dir.path());
        let store = Arc::new(ReferenceStore::with_config(StoreConfig::local(dir.path())).unwrap());
        let registry = ProjectRegistry::new(vec![
            project("langchain", "langchain"),
            project("langchain-core", "langchain-core"),
        ]);
        CrossPackageResolver::new(store, registry)
    }

    #[tokio::test]
    async fn test_prefix_match_resolves_owning_package() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_for(&dir);

        let link = resolver
            .resolve("python", "langchain_core.language_models.BaseChatModel")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(link.package_slug, "langchain-core");
        assert_eq!(link.url, "/python/langchain-core/classes/BaseChatModel/");
    }

    #[tokio::test]
    async fn test_foreign_prefix_falls_through_to_owner() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_for(&dir);

        // Referenced from langchain docs without a core prefix: the
        // "langchain" prefix matches a package that does not expose the
        // name, so the scan lands on langchain-core.
        let link = resolver
            .resolve("python", "langchain.language_models.BaseChatModel")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(link.package_slug, "langchain-core");
    }

    #[tokio::test]
    async fn test_bare_name_resolves() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_for(&dir);

        let link = resolver.resolve("python", "BaseChatModel").await.unwrap().unwrap();
        assert_eq!(link.package_slug, "langchain-core");
    }

    #[tokio::test]
    async fn test_functions_are_not_linkable() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_for(&dir);

        let link = resolver
            .resolve("python", "langchain_core.runnables.run_helper")
            .await
            .unwrap();
        assert!(link.is_none());
    }

    #[tokio::test]
    async fn test_unknown_reference_stays_unlinked() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver_for(&dir);

        assert!(resolver.resolve("python", "typing.Optional").await.unwrap().is_none());
        assert!(resolver.resolve("python", "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_package_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        fixture(dir.path());
        let store = Arc::new(ReferenceStore::with_config(StoreConfig::local(dir.path())).unwrap());
        let registry = ProjectRegistry::new(vec![
            project("langchain-core", "langchain-core"),
            project("langgraph", "langgraph"), // no pointer on disk
        ]);
        let resolver = CrossPackageResolver::new(store, registry);

        let link = resolver.resolve("python", "BaseChatModel").await.unwrap();
        assert!(link.is_some());
    }

    #[tokio::test]
    async fn test_map_rebuilds_after_window() {
        let dir = TempDir::new().unwrap();
        fixture(dir.path());
        let windows = CacheWindows {
            resolver: Duration::ZERO,
            pointer: Duration::ZERO,
            ..CacheWindows::default()
        };
        let store = Arc::new(
            ReferenceStore::with_config(StoreConfig::local(dir.path()))
                .unwrap()
                .with_windows(windows),
        );
        let registry = ProjectRegistry::new(vec![project("langchain-core", "langchain-core")]);
        let resolver = CrossPackageResolver::new(store, registry);

        assert!(resolver.resolve("python", "BaseChatModel").await.unwrap().is_some());

        // New build publishes a routing table without the class
        write_json(
            dir.path(),
            "pointers/packages/python/langchain-core.json",
            &json!({"buildId": "bld_core2"}),
        );
        write_json(
            dir.path(),
            "bld_core2/routing/python/langchain-core.json",
            &json!({
                "packageId": "langchain-core",
                "displayName": "langchain-core",
                "language": "python",
                "slugs": {}
            }),
        );

        assert!(resolver.resolve("python", "BaseChatModel").await.unwrap().is_none());
    }
}
