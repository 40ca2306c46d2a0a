//! Sharded catalog reader
//!
//! Assembles the full public catalog of one (build, package) from many
//! small shards fetched in parallel. Entry order is unspecified beyond
//! "stable within one process" - display order is the caller's job.

use std::sync::Arc;

use futures::future::try_join_all;

use crate::error::Result;
use crate::model::{CatalogEntry, CatalogShardIndex};

use super::{paths, ReferenceStore};

impl ReferenceStore {
    /// Every public catalog entry for one (build, package)
    ///
    /// A missing shard index means the package has no public catalog
    /// yet - empty, not an error. A shard fetch that exhausts its
    /// retries fails the whole request: a partial catalog would be
    /// indistinguishable from a complete one.
    pub async fn catalog(&self, build_id: &str, package_id: &str) -> Result<Vec<CatalogEntry>> {
        let Some(index) = self.catalog_index(build_id, package_id).await? else {
            return Ok(Vec::new());
        };

        let fetches = index
            .shards
            .iter()
            .map(|shard| self.catalog_shard(build_id, package_id, shard));
        let shards = try_join_all(fetches).await?;

        let mut entries = Vec::new();
        for (key, shard) in index.shards.iter().zip(shards) {
            match shard {
                Some(batch) => entries.extend(batch.iter().cloned()),
                None => {
                    // Index references a shard the producer never wrote:
                    // a pipeline inconsistency, not a missing package
                    tracing::warn!(
                        build_id,
                        package_id,
                        shard = %key,
                        "catalog shard listed in index but absent"
                    );
                    return Ok(Vec::new());
                }
            }
        }
        Ok(entries)
    }

    pub(crate) async fn catalog_index(
        &self,
        build_id: &str,
        package_id: &str,
    ) -> Result<Option<Arc<CatalogShardIndex>>> {
        if let Some(cached) = self.memory().catalog_index(build_id, package_id) {
            return Ok(cached);
        }

        let path = paths::catalog_index(package_id, build_id);
        let bytes = self.fetch_small(&path).await?;
        let value = bytes
            .and_then(|b| Self::parse::<CatalogShardIndex>(&path, &b))
            .map(Arc::new);

        self.memory().put_catalog_index(build_id, package_id, value.clone());
        Ok(value)
    }

    async fn catalog_shard(
        &self,
        build_id: &str,
        package_id: &str,
        shard: &str,
    ) -> Result<Option<Arc<Vec<CatalogEntry>>>> {
        if let Some(cached) = self.memory().catalog_shard(build_id, package_id, shard) {
            return Ok(cached);
        }

        let path = paths::catalog_shard(package_id, build_id, shard);
        let bytes = self.fetch_small_transient(&path).await?;
        let value = bytes
            .and_then(|b| Self::parse::<Vec<CatalogEntry>>(&path, &b))
            .map(Arc::new);

        self.memory()
            .put_catalog_shard(build_id, package_id, shard, value.clone());
        Ok(value)
    }
}
