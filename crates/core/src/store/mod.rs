//! Capacity-bounded, fingerprint-deduplicated record store.
//!
//! The whole collection lives in one JSON blob (newest first) under a fixed
//! key. Every mutation is a read-modify-write of that blob:
//!
//! - Duplicate fingerprints are rejected as an outcome, not an error
//! - Inserting past capacity evicts the oldest (tail) records
//! - Writes are guarded by the blob version; a lost race is retried once
//!   against a fresh read, then reported as [`Error::Conflict`]

pub mod backend;
pub mod fingerprint;
pub mod migrations;
pub mod sqlite;

use std::sync::Arc;

use serde_json::Value;

pub use backend::{Blob, BlobBackend, MemoryBackend};
pub use sqlite::SqliteBackend;

use crate::Error;
use crate::record::{ContentRecord, MetadataKey, validate_title};

/// Key the record collection is persisted under.
pub const STORE_KEY: &str = "pdcData";

/// Default maximum number of records kept.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Result of [`Store::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Stored at the head; `evicted` oldest records were dropped.
    Inserted { evicted: usize },
    /// A record with the same fingerprint already exists. Nothing changed.
    Duplicate,
}

impl InsertOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, InsertOutcome::Duplicate)
    }
}

/// Result of [`Store::rename`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    NotFound,
}

/// What a mutation closure decided to do with the loaded records.
enum Mutation<T> {
    /// Persist the (modified) records and return the value.
    Commit(T),
    /// Leave storage untouched and return the value.
    Abort(T),
}

/// Record store over an injectable [`BlobBackend`].
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn BlobBackend>,
    key: String,
    capacity: usize,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("key", &self.key)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Create a store over `backend` with the default key.
    pub fn new(backend: Arc<dyn BlobBackend>, capacity: usize) -> Self {
        Self { backend, key: STORE_KEY.to_string(), capacity: capacity.max(1) }
    }

    /// Store backed by a fresh [`MemoryBackend`].
    pub fn in_memory(capacity: usize) -> Self {
        Self::new(Arc::new(MemoryBackend::new()), capacity)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert a record at the head unless its fingerprint is already stored.
    ///
    /// The record is validated first; an invalid record never touches
    /// storage.
    pub async fn insert(&self, record: ContentRecord) -> Result<InsertOutcome, Error> {
        record.validate()?;
        let capacity = self.capacity;
        let outcome = self
            .modify(|records| {
                if records.iter().any(|r| r.fingerprint == record.fingerprint) {
                    return Mutation::Abort(InsertOutcome::Duplicate);
                }
                records.insert(0, record.clone());
                let evicted = records.len().saturating_sub(capacity);
                records.truncate(capacity);
                Mutation::Commit(InsertOutcome::Inserted { evicted })
            })
            .await?;

        match outcome {
            InsertOutcome::Duplicate => {
                tracing::debug!(hash = %record.fingerprint, "duplicate content, not stored");
            }
            InsertOutcome::Inserted { evicted } => {
                tracing::info!(hash = %record.fingerprint, title = %record.title, evicted, "content stored");
            }
        }

        Ok(outcome)
    }

    /// Overwrite the title of the record with `fingerprint`.
    ///
    /// The title is validated before anything is read, so an invalid title
    /// never touches storage.
    pub async fn rename(&self, fingerprint: &str, title: &str) -> Result<RenameOutcome, Error> {
        let title = validate_title(title)?;
        let outcome = self
            .modify(|records| match records.iter_mut().find(|r| r.fingerprint == fingerprint) {
                Some(record) => {
                    record.title = title.clone();
                    Mutation::Commit(RenameOutcome::Renamed)
                }
                None => Mutation::Abort(RenameOutcome::NotFound),
            })
            .await?;

        tracing::debug!(hash = fingerprint, ?outcome, "rename");
        Ok(outcome)
    }

    /// Remove the record at `index` (0 = newest).
    ///
    /// Returns the removed record, or `None` when the index is out of range.
    pub async fn delete(&self, index: usize) -> Result<Option<ContentRecord>, Error> {
        let removed = self
            .modify(|records| {
                if index < records.len() {
                    Mutation::Commit(Some(records.remove(index)))
                } else {
                    Mutation::Abort(None)
                }
            })
            .await?;

        if let Some(record) = &removed {
            tracing::info!(index, hash = %record.fingerprint, "content deleted");
        }
        Ok(removed)
    }

    /// All records, newest first.
    pub async fn list(&self) -> Result<Vec<ContentRecord>, Error> {
        Ok(self.load().await?.0)
    }

    /// Look up a record by fingerprint.
    pub async fn get(&self, fingerprint: &str) -> Result<Option<ContentRecord>, Error> {
        Ok(self.list().await?.into_iter().find(|r| r.fingerprint == fingerprint))
    }

    /// Number of stored records.
    pub async fn size(&self) -> Result<usize, Error> {
        Ok(self.load().await?.0.len())
    }

    /// Size of the persisted blob in bytes.
    pub async fn bytes_used(&self) -> Result<usize, Error> {
        Ok(self.backend.read(&self.key).await?.map_or(0, |b| b.value.len()))
    }

    /// Persist an empty collection if nothing is stored yet.
    ///
    /// Returns `true` when this call created it.
    pub async fn initialize(&self) -> Result<bool, Error> {
        if self.backend.read(&self.key).await?.is_some() {
            return Ok(false);
        }
        let created = self.backend.write(&self.key, "[]".to_string(), None).await?;
        if created {
            tracing::info!(key = %self.key, "storage initialized");
        }
        Ok(created)
    }

    /// Backfill fields missing from records written by older versions.
    ///
    /// Records without a `hash` get one computed from their content and url;
    /// records without `metadata` get an empty mapping, and metadata entries
    /// that are not allow-listed strings are dropped. Returns the number of
    /// records that changed. Storage is rewritten only if something changed.
    pub async fn migrate(&self) -> Result<usize, Error> {
        let Some(blob) = self.backend.read(&self.key).await? else {
            return Ok(0);
        };

        let mut items: Vec<Value> = serde_json::from_str(&blob.value)?;
        let migrated = items.iter_mut().filter_map(Value::as_object_mut).fold(0, |count, item| {
            let mut changed = false;

            let has_hash = item.get("hash").and_then(Value::as_str).is_some_and(|h| !h.is_empty());
            if !has_hash {
                let content = item.get("content").and_then(Value::as_str).unwrap_or_default();
                let url = item.get("url").and_then(Value::as_str).unwrap_or_default();
                let hash = fingerprint::fingerprint(content, url);
                item.insert("hash".into(), Value::String(hash));
                changed = true;
            }

            match item.get_mut("metadata").and_then(Value::as_object_mut) {
                Some(metadata) => {
                    let before = metadata.len();
                    metadata.retain(|key, value| value.is_string() && MetadataKey::from_key(key).is_some());
                    changed |= metadata.len() != before;
                }
                None => {
                    item.insert("metadata".into(), Value::Object(Default::default()));
                    changed = true;
                }
            }

            count + usize::from(changed)
        });

        if migrated == 0 {
            return Ok(0);
        }

        let value = serde_json::to_string(&items)?;
        if !self.backend.write(&self.key, value, Some(blob.version)).await? {
            return Err(Error::Conflict("storage changed during migration".into()));
        }

        tracing::info!(migrated, "data migration completed");
        Ok(migrated)
    }

    async fn load(&self) -> Result<(Vec<ContentRecord>, Option<u64>), Error> {
        match self.backend.read(&self.key).await? {
            Some(blob) => {
                let records = serde_json::from_str(&blob.value)?;
                Ok((records, Some(blob.version)))
            }
            None => Ok((Vec::new(), None)),
        }
    }

    /// Run one read-modify-write cycle, retrying once if another writer won.
    async fn modify<T, F>(&self, mut apply: F) -> Result<T, Error>
    where
        F: FnMut(&mut Vec<ContentRecord>) -> Mutation<T> + Send,
        T: Send,
    {
        for attempt in 0..2 {
            let (mut records, version) = self.load().await?;
            let value = match apply(&mut records) {
                Mutation::Abort(value) => return Ok(value),
                Mutation::Commit(value) => value,
            };

            let blob = serde_json::to_string(&records)?;
            if self.backend.write(&self.key, blob, version).await? {
                return Ok(value);
            }
            tracing::warn!(attempt, key = %self.key, "concurrent write detected, retrying");
        }

        Err(Error::Conflict(format!("{} was modified concurrently", self.key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Metadata;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_record(content: &str, url: &str) -> ContentRecord {
        ContentRecord::new("Test", url, content, Metadata::new())
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let store = Store::in_memory(DEFAULT_CAPACITY);
        let outcome = store.insert(make_record("a", "https://example.com")).await.unwrap();
        assert_eq!(outcome, InsertOutcome::Inserted { evicted: 0 });

        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "a");
    }

    #[tokio::test]
    async fn test_insert_duplicate_is_idempotent() {
        let store = Store::in_memory(DEFAULT_CAPACITY);
        store.insert(make_record("same", "https://example.com")).await.unwrap();
        let bytes_before = store.bytes_used().await.unwrap();

        let outcome = store.insert(make_record("same", "https://example.com")).await.unwrap();
        assert!(outcome.is_duplicate());
        assert_eq!(store.size().await.unwrap(), 1);
        assert_eq!(store.bytes_used().await.unwrap(), bytes_before);
    }

    #[tokio::test]
    async fn test_newest_first() {
        let store = Store::in_memory(DEFAULT_CAPACITY);
        store.insert(make_record("first", "u")).await.unwrap();
        store.insert(make_record("second", "u")).await.unwrap();

        let records = store.list().await.unwrap();
        assert_eq!(records[0].content, "second");
        assert_eq!(records[1].content, "first");
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let store = Store::in_memory(DEFAULT_CAPACITY);
        for i in 0..DEFAULT_CAPACITY {
            store.insert(make_record(&format!("item {i}"), "u")).await.unwrap();
        }

        let outcome = store.insert(make_record("item 1000", "u")).await.unwrap();
        assert_eq!(outcome, InsertOutcome::Inserted { evicted: 1 });

        let records = store.list().await.unwrap();
        assert_eq!(records.len(), DEFAULT_CAPACITY);
        assert_eq!(records[0].content, "item 1000");
        assert_eq!(records[DEFAULT_CAPACITY - 1].content, "item 1");
        assert!(records.iter().all(|r| r.content != "item 0"));
    }

    #[tokio::test]
    async fn test_rename_existing() {
        let store = Store::in_memory(DEFAULT_CAPACITY);
        let target = make_record("target", "u");
        let hash = target.fingerprint.clone();
        store.insert(make_record("other", "u")).await.unwrap();
        store.insert(target).await.unwrap();

        let outcome = store.rename(&hash, "  Renamed  ").await.unwrap();
        assert_eq!(outcome, RenameOutcome::Renamed);

        let records = store.list().await.unwrap();
        assert_eq!(records[0].title, "Renamed");
        assert_eq!(records[1].title, "Test");
    }

    #[tokio::test]
    async fn test_rename_missing_leaves_store_unchanged() {
        let store = Store::in_memory(DEFAULT_CAPACITY);
        store.insert(make_record("a", "u")).await.unwrap();
        let before = store.list().await.unwrap();

        let outcome = store.rename("000000000000", "New").await.unwrap();
        assert_eq!(outcome, RenameOutcome::NotFound);
        assert_eq!(store.list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_rename_blank_title_rejected() {
        let store = Store::in_memory(DEFAULT_CAPACITY);
        let record = make_record("a", "u");
        let hash = record.fingerprint.clone();
        store.insert(record).await.unwrap();

        let result = store.rename(&hash, "   ").await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(store.list().await.unwrap()[0].title, "Test");
    }

    #[tokio::test]
    async fn test_delete_by_index() {
        let store = Store::in_memory(DEFAULT_CAPACITY);
        store.insert(make_record("old", "u")).await.unwrap();
        store.insert(make_record("new", "u")).await.unwrap();

        let removed = store.delete(1).await.unwrap().unwrap();
        assert_eq!(removed.content, "old");
        assert_eq!(store.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_out_of_range() {
        let store = Store::in_memory(DEFAULT_CAPACITY);
        store.insert(make_record("a", "u")).await.unwrap();
        assert!(store.delete(5).await.unwrap().is_none());
        assert_eq!(store.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_by_fingerprint() {
        let store = Store::in_memory(DEFAULT_CAPACITY);
        let record = make_record("a", "u");
        let hash = record.fingerprint.clone();
        store.insert(record).await.unwrap();

        assert!(store.get(&hash).await.unwrap().is_some());
        assert!(store.get("ffffffffffff").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_initialize_once() {
        let store = Store::in_memory(DEFAULT_CAPACITY);
        assert_eq!(store.bytes_used().await.unwrap(), 0);
        assert!(store.initialize().await.unwrap());
        assert!(!store.initialize().await.unwrap());
        assert_eq!(store.size().await.unwrap(), 0);
        assert_eq!(store.bytes_used().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_migrate_backfills_legacy_records() {
        let backend = Arc::new(MemoryBackend::new());
        let legacy = r#"[
            {"title": "Old", "url": "https://example.com", "content": "legacy body", "timestamp": 1},
            {"title": "Meta", "url": "u", "content": "c", "timestamp": 2, "hash": "abcdefabcdef"}
        ]"#;
        backend.write(STORE_KEY, legacy.to_string(), None).await.unwrap();

        let store = Store::new(backend, DEFAULT_CAPACITY);
        assert_eq!(store.migrate().await.unwrap(), 2);

        let records = store.list().await.unwrap();
        assert_eq!(records[0].fingerprint, fingerprint::fingerprint("legacy body", "https://example.com"));
        assert!(records[0].metadata.is_empty());
        assert_eq!(records[1].fingerprint, "abcdefabcdef");

        assert_eq!(store.migrate().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_legacy_null_metadata_stays_readable() {
        let backend = Arc::new(MemoryBackend::new());
        let legacy = r#"[{"title": "Old", "url": "https://example.com", "content": "legacy body", "timestamp": 1,
            "hash": "abcdefabcdef", "metadata": {"published_time": null, "author": "Ann", "keywords": "k"}}]"#;
        backend.write(STORE_KEY, legacy.to_string(), None).await.unwrap();
        let store = Store::new(backend.clone(), DEFAULT_CAPACITY);

        let records = store.list().await.unwrap();
        assert_eq!(records[0].metadata.len(), 1);

        assert_eq!(store.migrate().await.unwrap(), 1);
        let raw = backend.read(STORE_KEY).await.unwrap().unwrap().value;
        assert!(!raw.contains("published_time"));
        assert!(!raw.contains("keywords"));
        assert_eq!(store.migrate().await.unwrap(), 0);

        assert_eq!(store.insert(make_record("new", "u")).await.unwrap(), InsertOutcome::Inserted { evicted: 0 });
        assert_eq!(store.size().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_record_before_writing() {
        let store = Store::in_memory(DEFAULT_CAPACITY);
        let mut record = make_record(&"x".repeat(150_000), "https://example.com");
        record.title = String::new();
        record.fingerprint = "not-a-hash".into();

        assert!(matches!(store.insert(record).await, Err(Error::InvalidInput(_))));
        assert_eq!(store.bytes_used().await.unwrap(), 0);

        let mut forged = make_record("body", "https://example.com");
        forged.fingerprint = "abcdefabcdef".into();
        assert!(store.insert(forged).await.is_err());
        assert_eq!(store.size().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_storage_error() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write(STORE_KEY, "not json".into(), None).await.unwrap();
        let store = Store::new(backend, DEFAULT_CAPACITY);

        assert!(matches!(store.list().await, Err(Error::Storage(_))));
        assert!(matches!(store.insert(make_record("a", "u")).await, Err(Error::Storage(_))));
    }

    /// Backend whose first `n` writes lose the race to another writer.
    struct RacingBackend {
        inner: MemoryBackend,
        losses: AtomicUsize,
    }

    #[async_trait]
    impl BlobBackend for RacingBackend {
        async fn read(&self, key: &str) -> Result<Option<Blob>, Error> {
            self.inner.read(key).await
        }

        async fn write(&self, key: &str, value: String, expected: Option<u64>) -> Result<bool, Error> {
            if self.losses.load(Ordering::SeqCst) > 0 {
                self.losses.fetch_sub(1, Ordering::SeqCst);
                let intruder = make_record("intruder", "u");
                let current = self.inner.read(key).await?;
                let mut records: Vec<ContentRecord> =
                    current.as_ref().map_or(Ok(Vec::new()), |b| serde_json::from_str(&b.value))?;
                records.insert(0, intruder);
                self.inner
                    .write(key, serde_json::to_string(&records)?, current.map(|b| b.version))
                    .await?;
            }
            self.inner.write(key, value, expected).await
        }
    }

    #[tokio::test]
    async fn test_lost_race_retried_once() {
        let backend = Arc::new(RacingBackend { inner: MemoryBackend::new(), losses: AtomicUsize::new(1) });
        let store = Store::new(backend, DEFAULT_CAPACITY);

        store.insert(make_record("mine", "u")).await.unwrap();

        let contents: Vec<_> = store.list().await.unwrap().into_iter().map(|r| r.content).collect();
        assert_eq!(contents, vec!["mine", "intruder"]);
    }

    #[tokio::test]
    async fn test_lost_race_twice_is_conflict() {
        let backend = Arc::new(RacingBackend { inner: MemoryBackend::new(), losses: AtomicUsize::new(2) });
        let store = Store::new(backend, DEFAULT_CAPACITY);

        let result = store.insert(make_record("mine", "u")).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_store_over_sqlite() {
        let backend = Arc::new(SqliteBackend::open_in_memory().await.unwrap());
        let store = Store::new(backend, 2);
        store.initialize().await.unwrap();

        for content in ["a", "b", "c"] {
            store.insert(make_record(content, "u")).await.unwrap();
        }

        let contents: Vec<_> = store.list().await.unwrap().into_iter().map(|r| r.content).collect();
        assert_eq!(contents, vec!["c", "b"]);
    }
}
