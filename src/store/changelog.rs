//! Changelog reader
//!
//! Release history is sharded with the same key derivation as catalog
//! and lookup data, so one symbol's history costs one shard fetch.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::model::ChangelogEntry;
use crate::shard;

use super::{paths, ReferenceStore};

impl ReferenceStore {
    /// Release history for one symbol; absent shard or name -> empty
    pub async fn changelog(
        &self,
        build_id: &str,
        package_id: &str,
        qualified_name: &str,
    ) -> Result<Vec<ChangelogEntry>> {
        let shard = shard::shard_key(qualified_name);
        let Some(table) = self.changelog_shard(build_id, package_id, &shard).await? else {
            return Ok(Vec::new());
        };
        Ok(table.get(qualified_name).cloned().unwrap_or_default())
    }

    async fn changelog_shard(
        &self,
        build_id: &str,
        package_id: &str,
        shard: &str,
    ) -> Result<Option<Arc<HashMap<String, Vec<ChangelogEntry>>>>> {
        if let Some(cached) = self.memory().changelog_shard(build_id, package_id, shard) {
            return Ok(cached);
        }

        let path = paths::changelog_shard(package_id, build_id, shard);
        let bytes = self.fetch_small_transient(&path).await?;
        let value = bytes
            .and_then(|b| Self::parse::<HashMap<String, Vec<ChangelogEntry>>>(&path, &b))
            .map(Arc::new);

        self.memory()
            .put_changelog_shard(build_id, package_id, shard, value.clone());
        Ok(value)
    }
}
