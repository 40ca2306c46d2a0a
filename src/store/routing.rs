//! Routing table reader
//!
//! The slug -> {kind, pageType, title} map used to decide ahead of time
//! which symbol pages are generated eagerly.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::model::{RoutingEntry, RoutingTable, SymbolKind};

use super::{paths, ReferenceStore};

/// Kinds surfaced for eager generation
///
/// Bounds how much output the build process produces - a policy knob,
/// not a correctness requirement. Everything outside the allow-list is
/// resolved on demand when first requested.
#[derive(Debug, Clone)]
pub struct EagerPolicy {
    kinds: HashSet<SymbolKind>,
}

impl Default for EagerPolicy {
    fn default() -> Self {
        Self::new([SymbolKind::Class, SymbolKind::Function])
    }
}

impl EagerPolicy {
    pub fn new(kinds: impl IntoIterator<Item = SymbolKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn allows(&self, kind: SymbolKind) -> bool {
        self.kinds.contains(&kind)
    }
}

impl ReferenceStore {
    pub async fn routing_table(
        &self,
        build_id: &str,
        language: &str,
        package_id: &str,
    ) -> Result<Option<Arc<RoutingTable>>> {
        if let Some(cached) = self.memory().routing_table(build_id, language, package_id) {
            return Ok(cached);
        }

        let path = paths::routing_table(build_id, language, package_id);
        let bytes = self.fetch_small(&path).await?;
        let value = bytes
            .and_then(|b| Self::parse::<RoutingTable>(&path, &b))
            .map(Arc::new);

        self.memory()
            .put_routing_table(build_id, language, package_id, value.clone());
        Ok(value)
    }

    /// Slugs that must be generated ahead of time under `policy`,
    /// sorted for a deterministic generation order
    pub fn eager_slugs<'a>(
        table: &'a RoutingTable,
        policy: &EagerPolicy,
    ) -> Vec<(&'a str, &'a RoutingEntry)> {
        let mut slugs: Vec<_> = table
            .slugs
            .iter()
            .filter(|(_, entry)| policy.allows(entry.kind))
            .map(|(slug, entry)| (slug.as_str(), entry))
            .collect();
        slugs.sort_by(|a, b| a.0.cmp(b.0));
        slugs
    }
}
