//! Cross-invocation persistent cache tier
//!
//! Only meaningful when many short-lived processes share a disk (a
//! serverless deployment model). Entries are raw payload bytes under a
//! hashed file name; freshness is the file's mtime against a
//! revalidation window. Large resources bypass this tier entirely -
//! they would blow past the per-entry size ceiling the shared cache is
//! provisioned for.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::Result;
use crate::shard;

pub struct PersistentCache {
    root: PathBuf,
}

impl PersistentCache {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        tracing::info!(root = %root.display(), "persistent cache tier ready");
        Ok(Self { root })
    }

    /// Fresh payload bytes for `key`, or `None` on a miss or a stale
    /// entry. Clock skew reads as a miss rather than an error.
    pub fn get(&self, key: &str, max_age: Duration) -> Option<Vec<u8>> {
        let path = self.entry_path(key);
        let modified = fs::metadata(&path).ok()?.modified().ok()?;
        let age = SystemTime::now().duration_since(modified).ok()?;
        if age >= max_age {
            return None;
        }
        fs::read(&path).ok()
    }

    /// Best-effort write; a failed write never fails the read path.
    pub fn put(&self, key: &str, bytes: &[u8]) {
        let path = self.entry_path(key);
        let tmp = path.with_extension("tmp");
        let result = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, &path));
        if let Err(err) = result {
            tracing::warn!(key, %err, "persistent cache write failed");
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", shard::cache_file_name(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_roundtrip_within_window() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache.put("bld_1/reference.manifest.json", b"{\"buildId\":\"bld_1\"}");
        let bytes = cache.get("bld_1/reference.manifest.json", Duration::from_secs(3600));
        assert_eq!(bytes.as_deref(), Some(&b"{\"buildId\":\"bld_1\"}"[..]));
    }

    #[test]
    fn test_stale_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache.put("pointers/latest-build.json", b"{}");
        std::thread::sleep(Duration::from_millis(20));
        assert!(cache
            .get("pointers/latest-build.json", Duration::from_millis(1))
            .is_none());
    }

    #[test]
    fn test_unknown_key_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();
        assert!(cache.get("never-written", Duration::from_secs(10)).is_none());
    }

    #[test]
    fn test_keys_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache.put("a/lookup/0a.json", b"1");
        cache.put("b/lookup/0a.json", b"2");
        assert_eq!(cache.get("a/lookup/0a.json", Duration::from_secs(10)).unwrap(), b"1");
        assert_eq!(cache.get("b/lookup/0a.json", Duration::from_secs(10)).unwrap(), b"2");
    }
}
