//! Persistence backends for the store.
//!
//! A backend holds opaque string blobs by key. Each blob carries a version
//! that increments on every write; writes name the version they expect so a
//! racing writer is detected instead of silently overwritten.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::Error;

/// A stored value together with its write version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub value: String,
    pub version: u64,
}

/// Key/value persistence used by [`crate::Store`].
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Read the blob stored under `key`, if any.
    async fn read(&self, key: &str) -> Result<Option<Blob>, Error>;

    /// Write `value` under `key`.
    ///
    /// `expected` is the version observed by the caller's read (`None` when
    /// the key was absent). Returns `false` without writing if the stored
    /// version no longer matches.
    async fn write(&self, key: &str, value: String, expected: Option<u64>) -> Result<bool, Error>;
}

/// In-process backend, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    blobs: Mutex<HashMap<String, Blob>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobBackend for MemoryBackend {
    async fn read(&self, key: &str) -> Result<Option<Blob>, Error> {
        Ok(self.blobs.lock().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: String, expected: Option<u64>) -> Result<bool, Error> {
        let mut blobs = self.blobs.lock().await;
        let current = blobs.get(key).map(|b| b.version);
        if current != expected {
            return Ok(false);
        }
        let version = current.map_or(1, |v| v + 1);
        blobs.insert(key.to_string(), Blob { value, version });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_read_missing() {
        let backend = MemoryBackend::new();
        assert!(backend.read("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_write_versions() {
        let backend = MemoryBackend::new();
        assert!(backend.write("k", "a".into(), None).await.unwrap());
        assert_eq!(backend.read("k").await.unwrap().unwrap().version, 1);

        assert!(backend.write("k", "b".into(), Some(1)).await.unwrap());
        let blob = backend.read("k").await.unwrap().unwrap();
        assert_eq!(blob, Blob { value: "b".into(), version: 2 });
    }

    #[tokio::test]
    async fn test_memory_stale_write_rejected() {
        let backend = MemoryBackend::new();
        backend.write("k", "a".into(), None).await.unwrap();
        backend.write("k", "b".into(), Some(1)).await.unwrap();

        assert!(!backend.write("k", "stale".into(), Some(1)).await.unwrap());
        assert!(!backend.write("k", "stale".into(), None).await.unwrap());
        assert_eq!(backend.read("k").await.unwrap().unwrap().value, "b");
    }
}
