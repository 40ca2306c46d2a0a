//! Pointer resolver: tiny name -> build-identifier lookups
//!
//! Leaf dependency for everything else. Pointer records revalidate on
//! the short window in both tiers so a newly published build becomes
//! visible within a minute, not an hour.

use std::sync::Arc;

use crate::error::Result;
use crate::model::Pointer;

use super::{paths, ReferenceStore};

impl ReferenceStore {
    /// Resolve a logical pointer name to its record
    pub async fn pointer(&self, name: &str) -> Result<Option<Arc<Pointer>>> {
        if let Some(cached) = self.memory().pointer(name, self.windows().pointer) {
            return Ok(cached);
        }

        let path = paths::pointer(name);
        let bytes = self
            .fetch_small_windowed(&path, self.windows().pointer)
            .await?;
        let value = bytes
            .and_then(|b| Self::parse::<Pointer>(&path, &b))
            .map(Arc::new);

        self.memory().put_pointer(name, value.clone());
        Ok(value)
    }

    /// Latest build across the whole corpus
    pub async fn latest_build(&self) -> Result<Option<Arc<Pointer>>> {
        self.pointer("latest-build").await
    }

    /// Latest build for one project+language pair
    pub async fn latest_project_build(
        &self,
        project: &str,
        language: &str,
    ) -> Result<Option<Arc<Pointer>>> {
        self.pointer(&format!("latest-{project}-{language}")).await
    }

    /// Latest build for one published package within an ecosystem
    pub async fn package_pointer(
        &self,
        ecosystem: &str,
        package_name: &str,
    ) -> Result<Option<Arc<Pointer>>> {
        self.pointer(&format!("packages/{ecosystem}/{package_name}"))
            .await
    }
}
