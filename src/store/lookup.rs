//! Sharded lookup / individual-symbol reader
//!
//! Resolves one qualified name touching the smallest possible amount of
//! data: one lookup shard, then one individual symbol object. Builds
//! produced before the sharded layout existed fall back to a linear
//! scan of the full per-package dump, so the fast path is an
//! optimization, never a correctness requirement.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::model::{LookupEntry, Symbol, SymbolDump};
use crate::shard;

use super::{paths, ReferenceStore};

impl ReferenceStore {
    /// Resolve one qualified name to its full symbol record
    pub async fn symbol_by_name(
        &self,
        build_id: &str,
        package_id: &str,
        qualified_name: &str,
    ) -> Result<Option<Arc<Symbol>>> {
        let shard = shard::shard_key(qualified_name);
        if let Some(table) = self.lookup_shard(build_id, package_id, &shard).await? {
            if let Some(entry) = table.get(qualified_name) {
                if let Some(symbol) = self.symbol_object(build_id, &entry.id).await? {
                    return Ok(Some(symbol));
                }
                // A lookup hit without its object is the signature of a
                // pipeline gap, not an old build; the dump still has it
                tracing::warn!(
                    build_id,
                    package_id,
                    symbol_id = %entry.id,
                    "individual symbol object absent for lookup hit, falling back to full dump"
                );
            }
        }

        self.symbol_from_dump(build_id, package_id, qualified_name).await
    }

    /// Full per-package symbol dump. Large class: memory tier only.
    pub async fn symbol_dump(
        &self,
        build_id: &str,
        package_id: &str,
    ) -> Result<Option<Arc<Vec<Symbol>>>> {
        if let Some(cached) = self.memory().symbol_dump(build_id, package_id) {
            return Ok(cached);
        }

        let path = paths::symbol_dump(package_id, build_id);
        let bytes = self.fetch_large(&path).await?;
        let value = bytes
            .and_then(|b| Self::parse::<SymbolDump>(&path, &b))
            .map(|dump| Arc::new(dump.symbols));

        self.memory().put_symbol_dump(build_id, package_id, value.clone());
        Ok(value)
    }

    async fn lookup_shard(
        &self,
        build_id: &str,
        package_id: &str,
        shard: &str,
    ) -> Result<Option<Arc<HashMap<String, LookupEntry>>>> {
        if let Some(cached) = self.memory().lookup_shard(build_id, package_id, shard) {
            return Ok(cached);
        }

        let path = paths::lookup_shard(package_id, build_id, shard);
        let bytes = self.fetch_small(&path).await?;
        let value = bytes
            .and_then(|b| Self::parse::<HashMap<String, LookupEntry>>(&path, &b))
            .map(Arc::new);

        self.memory()
            .put_lookup_shard(build_id, package_id, shard, value.clone());
        Ok(value)
    }

    async fn symbol_object(
        &self,
        build_id: &str,
        symbol_id: &str,
    ) -> Result<Option<Arc<Symbol>>> {
        if let Some(cached) = self.memory().symbol(build_id, symbol_id) {
            return Ok(cached);
        }

        let path = paths::symbol_object(build_id, &shard::symbol_shard(symbol_id), symbol_id);
        let bytes = self.fetch_small_transient(&path).await?;
        let value = bytes
            .and_then(|b| Self::parse::<Symbol>(&path, &b))
            .map(Arc::new);

        self.memory().put_symbol(build_id, symbol_id, value.clone());
        Ok(value)
    }

    /// Fallback scan with the tie-break ladder: exact qualified name,
    /// then `*.name` suffix, then last-segment equality. The first rule
    /// to produce a match wins.
    async fn symbol_from_dump(
        &self,
        build_id: &str,
        package_id: &str,
        qualified_name: &str,
    ) -> Result<Option<Arc<Symbol>>> {
        let Some(dump) = self.symbol_dump(build_id, package_id).await? else {
            return Ok(None);
        };

        if let Some(symbol) = dump.iter().find(|s| s.qualified_name == qualified_name) {
            return Ok(Some(Arc::new(symbol.clone())));
        }

        let dotted = format!(".{qualified_name}");
        if let Some(symbol) = dump.iter().find(|s| s.qualified_name.ends_with(&dotted)) {
            return Ok(Some(Arc::new(symbol.clone())));
        }

        let last = qualified_name.rsplit('.').next().unwrap_or(qualified_name);
        if let Some(symbol) = dump
            .iter()
            .find(|s| s.qualified_name.rsplit('.').next() == Some(last))
        {
            return Ok(Some(Arc::new(symbol.clone())));
        }

        Ok(None)
    }
}
