//! Cache tiers in front of the transport
//!
//! - [`MemoryCache`]: per-process maps, one per resource type, never
//!   evicted within the process lifetime (pointers excepted - they
//!   revalidate so a new deploy becomes visible).
//! - [`PersistentCache`]: optional cross-invocation tier with
//!   revalidate-after-duration freshness.
//!
//! Keys always embed (build, package, resource, shard) so two builds of
//! the same package never collide. Values are immutable upstream data;
//! concurrent writers racing on a key write identical values, so
//! last-writer-wins is safe and no single-flight guarantee is made.

pub mod persistent;

pub use persistent::PersistentCache;

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::model::{
    CatalogEntry, CatalogShardIndex, ChangelogEntry, LookupEntry, Manifest, Pointer, RoutingTable,
    Symbol,
};

/// `None` = never cached; `Some(None)` = cached definitive absence;
/// `Some(Some(v))` = cached value.
pub type Cached<T> = Option<Option<Arc<T>>>;

type Map<K, V> = Mutex<HashMap<K, Option<Arc<V>>>>;

/// (buildId, packageId)
type PackageKey = (String, String);

/// (buildId, packageId, shardKey)
type ShardedKey = (String, String, String);

#[derive(Default)]
pub struct MemoryCache {
    manifests: Map<String, Manifest>,
    catalog_indexes: Map<PackageKey, CatalogShardIndex>,
    catalog_shards: Map<ShardedKey, Vec<CatalogEntry>>,
    lookup_shards: Map<ShardedKey, HashMap<String, LookupEntry>>,
    /// keyed by (buildId, symbolId)
    symbols: Map<PackageKey, Symbol>,
    symbol_dumps: Map<PackageKey, Vec<Symbol>>,
    /// keyed by (buildId, language, packageId)
    routing_tables: Map<ShardedKey, RoutingTable>,
    changelog_shards: Map<ShardedKey, HashMap<String, Vec<ChangelogEntry>>>,
    pointers: Mutex<HashMap<String, (Instant, Option<Arc<Pointer>>)>>,
}

fn lookup<K: Eq + Hash, V>(map: &Map<K, V>, key: &K) -> Cached<V> {
    map.lock().unwrap().get(key).cloned()
}

fn insert<K: Eq + Hash, V>(map: &Map<K, V>, key: K, value: Option<Arc<V>>) {
    map.lock().unwrap().insert(key, value);
}

impl MemoryCache {
    pub fn manifest(&self, build_id: &str) -> Cached<Manifest> {
        lookup(&self.manifests, &build_id.to_string())
    }

    pub fn put_manifest(&self, build_id: &str, value: Option<Arc<Manifest>>) {
        insert(&self.manifests, build_id.to_string(), value);
    }

    pub fn catalog_index(&self, build_id: &str, package_id: &str) -> Cached<CatalogShardIndex> {
        lookup(&self.catalog_indexes, &key2(build_id, package_id))
    }

    pub fn put_catalog_index(
        &self,
        build_id: &str,
        package_id: &str,
        value: Option<Arc<CatalogShardIndex>>,
    ) {
        insert(&self.catalog_indexes, key2(build_id, package_id), value);
    }

    pub fn catalog_shard(
        &self,
        build_id: &str,
        package_id: &str,
        shard: &str,
    ) -> Cached<Vec<CatalogEntry>> {
        lookup(&self.catalog_shards, &key3(build_id, package_id, shard))
    }

    pub fn put_catalog_shard(
        &self,
        build_id: &str,
        package_id: &str,
        shard: &str,
        value: Option<Arc<Vec<CatalogEntry>>>,
    ) {
        insert(&self.catalog_shards, key3(build_id, package_id, shard), value);
    }

    pub fn lookup_shard(
        &self,
        build_id: &str,
        package_id: &str,
        shard: &str,
    ) -> Cached<HashMap<String, LookupEntry>> {
        lookup(&self.lookup_shards, &key3(build_id, package_id, shard))
    }

    pub fn put_lookup_shard(
        &self,
        build_id: &str,
        package_id: &str,
        shard: &str,
        value: Option<Arc<HashMap<String, LookupEntry>>>,
    ) {
        insert(&self.lookup_shards, key3(build_id, package_id, shard), value);
    }

    pub fn symbol(&self, build_id: &str, symbol_id: &str) -> Cached<Symbol> {
        lookup(&self.symbols, &key2(build_id, symbol_id))
    }

    pub fn put_symbol(&self, build_id: &str, symbol_id: &str, value: Option<Arc<Symbol>>) {
        insert(&self.symbols, key2(build_id, symbol_id), value);
    }

    pub fn symbol_dump(&self, build_id: &str, package_id: &str) -> Cached<Vec<Symbol>> {
        lookup(&self.symbol_dumps, &key2(build_id, package_id))
    }

    pub fn put_symbol_dump(
        &self,
        build_id: &str,
        package_id: &str,
        value: Option<Arc<Vec<Symbol>>>,
    ) {
        insert(&self.symbol_dumps, key2(build_id, package_id), value);
    }

    pub fn routing_table(
        &self,
        build_id: &str,
        language: &str,
        package_id: &str,
    ) -> Cached<RoutingTable> {
        lookup(&self.routing_tables, &key3(build_id, language, package_id))
    }

    pub fn put_routing_table(
        &self,
        build_id: &str,
        language: &str,
        package_id: &str,
        value: Option<Arc<RoutingTable>>,
    ) {
        insert(&self.routing_tables, key3(build_id, language, package_id), value);
    }

    pub fn changelog_shard(
        &self,
        build_id: &str,
        package_id: &str,
        shard: &str,
    ) -> Cached<HashMap<String, Vec<ChangelogEntry>>> {
        lookup(&self.changelog_shards, &key3(build_id, package_id, shard))
    }

    pub fn put_changelog_shard(
        &self,
        build_id: &str,
        package_id: &str,
        shard: &str,
        value: Option<Arc<HashMap<String, Vec<ChangelogEntry>>>>,
    ) {
        insert(&self.changelog_shards, key3(build_id, package_id, shard), value);
    }

    /// Pointers are the one resource revalidated inside the process:
    /// entries older than `window` read as misses.
    pub fn pointer(&self, name: &str, window: Duration) -> Cached<Pointer> {
        let map = self.pointers.lock().unwrap();
        let (stamp, value) = map.get(name)?;
        if stamp.elapsed() >= window {
            return None;
        }
        Some(value.clone())
    }

    pub fn put_pointer(&self, name: &str, value: Option<Arc<Pointer>>) {
        self.pointers
            .lock()
            .unwrap()
            .insert(name.to_string(), (Instant::now(), value));
    }
}

fn key2(a: &str, b: &str) -> (String, String) {
    (a.to_string(), b.to_string())
}

fn key3(a: &str, b: &str, c: &str) -> (String, String, String) {
    (a.to_string(), b.to_string(), c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_then_hit() {
        let cache = MemoryCache::default();
        assert!(cache.catalog_shard("bld_1", "langchain", "0a").is_none());

        cache.put_catalog_shard("bld_1", "langchain", "0a", Some(Arc::new(Vec::new())));
        let hit = cache.catalog_shard("bld_1", "langchain", "0a");
        assert!(matches!(hit, Some(Some(_))));
    }

    #[test]
    fn test_negative_result_is_cached() {
        let cache = MemoryCache::default();
        cache.put_manifest("bld_1", None);
        // Cached absence is distinct from a plain miss
        assert!(matches!(cache.manifest("bld_1"), Some(None)));
        assert!(cache.manifest("bld_2").is_none());
    }

    #[test]
    fn test_builds_do_not_collide() {
        let cache = MemoryCache::default();
        cache.put_symbol_dump("bld_1", "langchain", Some(Arc::new(Vec::new())));
        assert!(cache.symbol_dump("bld_2", "langchain").is_none());
    }

    #[test]
    fn test_pointer_revalidates_after_window() {
        let cache = MemoryCache::default();
        cache.put_pointer("latest-build", None);

        assert!(cache.pointer("latest-build", Duration::from_secs(60)).is_some());
        // Zero window: always stale
        assert!(cache.pointer("latest-build", Duration::ZERO).is_none());
    }
}
