//! Manifest / package index reader

use std::sync::Arc;

use crate::error::Result;
use crate::model::{Manifest, PackageMeta};

use super::{paths, ReferenceStore};

impl ReferenceStore {
    /// Per-build metadata listing every package in the build.
    /// Cached for the process lifetime plus the long persistent window.
    pub async fn manifest(&self, build_id: &str) -> Result<Option<Arc<Manifest>>> {
        if let Some(cached) = self.memory().manifest(build_id) {
            return Ok(cached);
        }

        let path = paths::manifest(build_id);
        let bytes = self.fetch_small(&path).await?;
        let value = bytes
            .and_then(|b| Self::parse::<Manifest>(&path, &b))
            .map(Arc::new);

        self.memory().put_manifest(build_id, value.clone());
        Ok(value)
    }

    /// Metadata for one package by its identifier
    pub async fn package_meta(
        &self,
        build_id: &str,
        package_id: &str,
    ) -> Result<Option<PackageMeta>> {
        let Some(manifest) = self.manifest(build_id).await? else {
            return Ok(None);
        };
        Ok(manifest.packages.iter().find(|p| p.id == package_id).cloned())
    }

    /// Metadata for one package by its published (display) name
    pub async fn package_by_name(
        &self,
        build_id: &str,
        published_name: &str,
    ) -> Result<Option<PackageMeta>> {
        let Some(manifest) = self.manifest(build_id).await? else {
            return Ok(None);
        };
        Ok(manifest
            .packages
            .iter()
            .find(|p| p.display_name == published_name)
            .cloned())
    }
}
