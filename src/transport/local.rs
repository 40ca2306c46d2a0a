//! Local filesystem mirror of the blob store layout
//!
//! Used in development and when the dataset was synced to disk ahead of
//! a build step. Resource paths are identical to the remote layout,
//! rooted at a directory instead of a base URL.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;

use super::{FetchBackend, SizeClass};

pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        tracing::info!(root = %root.display(), "local reference backend ready");
        Self { root }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

#[async_trait]
impl FetchBackend for LocalBackend {
    async fn fetch(&self, path: &str, _class: SizeClass) -> Result<Option<Vec<u8>>> {
        let full = self.root.join(path);
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path, "resource absent");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_existing_file() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("pointers");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("latest-build.json"), b"{\"buildId\":\"bld_1\"}").unwrap();

        let backend = LocalBackend::new(dir.path());
        let bytes = backend
            .fetch("pointers/latest-build.json", SizeClass::Small)
            .await
            .unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"{\"buildId\":\"bld_1\"}"[..]));
    }

    #[tokio::test]
    async fn test_missing_file_is_definitive_absence() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::new(dir.path());
        let bytes = backend.fetch("no/such/file.json", SizeClass::Small).await.unwrap();
        assert!(bytes.is_none());
    }
}
