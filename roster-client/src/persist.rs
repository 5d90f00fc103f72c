//! Snapshot persistence.
//!
//! A [`SnapshotStore`] is an opaque key-value blob store. The user collection
//! is written to it whole, under one key, after every change, and read back
//! once at startup to seed the store before the first fetch lands.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use roster_core::{decode_snapshot, encode_snapshot, Collection, SnapshotError};
use thiserror::Error;
use uuid::Uuid;

use crate::store::{SubscriptionId, UserStore};

/// Snapshot persistence failures.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem access failed.
    #[error("snapshot i/o failed for {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The snapshot could not be encoded or decoded.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// The backing store refused the write.
    #[error("snapshot store error: {0}")]
    Store(String),
}

/// Key-value blob store holding whole-collection snapshots.
///
/// Calls are synchronous; implementations are expected to be fast local
/// storage.
pub trait SnapshotStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError>;

    /// Replace the value stored under `key`.
    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistError>;
}

/// Read and decode the snapshot under `key`.
pub fn load_collection(
    snapshots: &dyn SnapshotStore,
    key: &str,
) -> Result<Option<Collection>, PersistError> {
    match snapshots.load(key)? {
        Some(bytes) => Ok(Some(decode_snapshot(&bytes)?)),
        None => Ok(None),
    }
}

/// Encode and write `collection` under `key`.
pub fn save_collection(
    snapshots: &dyn SnapshotStore,
    key: &str,
    collection: &Collection,
) -> Result<(), PersistError> {
    let bytes = encode_snapshot(collection)?;
    snapshots.save(key, &bytes)
}

/// Seed `store` from the snapshot under `key`.
///
/// A missing snapshot leaves the store empty. An unreadable one is logged and
/// treated as missing. Returns the number of records restored.
pub fn restore(store: &UserStore, snapshots: &dyn SnapshotStore, key: &str) -> usize {
    match load_collection(snapshots, key) {
        Ok(Some(collection)) => {
            let len = collection.len();
            tracing::debug!(key, len, "restored snapshot");
            store.seed(collection);
            len
        }
        Ok(None) => 0,
        Err(e) => {
            tracing::warn!(key, "ignoring unreadable snapshot: {}", e);
            0
        }
    }
}

/// Mirror every change of `store` into `snapshots` under `key`.
///
/// Write failures are logged; they never fail the mutation.
pub fn persist(
    store: &UserStore,
    snapshots: Arc<dyn SnapshotStore>,
    key: &str,
) -> SubscriptionId {
    let key = key.to_string();
    store.subscribe(move |collection| {
        if let Err(e) = save_collection(snapshots.as_ref(), &key, collection) {
            tracing::warn!(key = %key, "failed to persist snapshot: {}", e);
        }
    })
}

/// In-memory snapshot store for tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySnapshots {
    inner: Arc<Mutex<MemorySnapshotsInner>>,
}

#[derive(Debug, Default)]
struct MemorySnapshotsInner {
    values: HashMap<String, Vec<u8>>,
    writes: usize,
    fail_next_save: Option<String>,
}

impl MemorySnapshots {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemorySnapshotsInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raw bytes under `key`.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().values.get(key).cloned()
    }

    /// Store raw bytes under `key`, bypassing the write counter.
    pub fn put(&self, key: &str, bytes: &[u8]) {
        self.lock().values.insert(key.to_string(), bytes.to_vec());
    }

    /// Number of successful `save` calls.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    /// Cause the next `save` to fail with `error`.
    pub fn fail_next_save(&self, error: &str) {
        self.lock().fail_next_save = Some(error.to_string());
    }
}

impl SnapshotStore for MemorySnapshots {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistError> {
        let mut inner = self.lock();
        if let Some(error) = inner.fail_next_save.take() {
            return Err(PersistError::Store(error));
        }
        inner.values.insert(key.to_string(), bytes.to_vec());
        inner.writes += 1;
        Ok(())
    }
}

/// Snapshot store writing `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never sees a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileSnapshots {
    dir: PathBuf,
}

impl FileSnapshots {
    /// Store snapshots under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File path for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PersistError {
    let path = path.to_path_buf();
    move |source| PersistError::Io { path, source }
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let mut file = std::fs::File::create(path).map_err(io_error(path))?;
    file.write_all(bytes).map_err(io_error(path))?;
    file.sync_all().map_err(io_error(path))
}

impl SnapshotStore for FileSnapshots {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), PersistError> {
        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        let path = self.path_for(key);
        // One temp file per write, so concurrent writers never share one.
        let tmp = self.dir.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        let written = write_synced(&tmp, bytes)
            .and_then(|()| std::fs::rename(&tmp, &path).map_err(io_error(&path)));
        if written.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::SNAPSHOT_KEY;
    use roster_types::{UserKey, UserRecord};
    use tempfile::tempdir;

    fn sample() -> Collection {
        Collection::from_records(vec![
            UserRecord::bare("b").with("name", "Bob"),
            UserRecord::bare("a").with("name", "Alice"),
        ])
    }

    // ===========================================
    // Round Trips
    // ===========================================

    #[test]
    fn memory_roundtrip() {
        let snapshots = MemorySnapshots::new();
        save_collection(&snapshots, SNAPSHOT_KEY, &sample()).unwrap();

        let restored = load_collection(&snapshots, SNAPSHOT_KEY).unwrap();
        assert_eq!(restored, Some(sample()));
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempdir().unwrap();
        let snapshots = FileSnapshots::new(dir.path().join("nested"));

        save_collection(&snapshots, SNAPSHOT_KEY, &sample()).unwrap();

        assert!(snapshots.path_for(SNAPSHOT_KEY).exists());
        let restored = load_collection(&snapshots, SNAPSHOT_KEY).unwrap();
        assert_eq!(restored, Some(sample()));
    }

    #[test]
    fn file_save_replaces_whole_value() {
        let dir = tempdir().unwrap();
        let snapshots = FileSnapshots::new(dir.path());

        save_collection(&snapshots, SNAPSHOT_KEY, &sample()).unwrap();
        let smaller = Collection::from_records(vec![UserRecord::bare("only")]);
        save_collection(&snapshots, SNAPSHOT_KEY, &smaller).unwrap();

        let restored = load_collection(&snapshots, SNAPSHOT_KEY).unwrap();
        assert_eq!(restored, Some(smaller));
        assert_eq!(leftover_temp_files(dir.path()), 0);
    }

    fn leftover_temp_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count()
    }

    #[test]
    fn concurrent_file_saves_all_land() {
        let dir = tempdir().unwrap();
        let snapshots = FileSnapshots::new(dir.path());

        let writers: Vec<_> = (0..2)
            .map(|n| {
                let snapshots = snapshots.clone();
                std::thread::spawn(move || {
                    let collection = Collection::from_records(vec![UserRecord::bare(format!("w{n}"))]);
                    (0..200)
                        .filter(|_| save_collection(&snapshots, SNAPSHOT_KEY, &collection).is_err())
                        .count()
                })
            })
            .collect();
        let failures: usize = writers.into_iter().map(|w| w.join().unwrap()).sum();

        assert_eq!(failures, 0);
        let saved = load_collection(&snapshots, SNAPSHOT_KEY).unwrap().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(leftover_temp_files(dir.path()), 0);
    }

    #[test]
    fn missing_snapshot_is_none() {
        let dir = tempdir().unwrap();
        let snapshots = FileSnapshots::new(dir.path());
        assert!(load_collection(&snapshots, SNAPSHOT_KEY).unwrap().is_none());
        assert!(load_collection(&MemorySnapshots::new(), SNAPSHOT_KEY)
            .unwrap()
            .is_none());
    }

    // ===========================================
    // Store Integration
    // ===========================================

    #[test]
    fn restore_seeds_store() {
        let snapshots = MemorySnapshots::new();
        save_collection(&snapshots, SNAPSHOT_KEY, &sample()).unwrap();
        let store = UserStore::new();

        assert_eq!(restore(&store, &snapshots, SNAPSHOT_KEY), 2);
        assert_eq!(store.snapshot(), sample());
    }

    #[test]
    fn restore_ignores_corrupt_snapshot() {
        let snapshots = MemorySnapshots::new();
        snapshots.put(SNAPSHOT_KEY, b"{garbage");
        let store = UserStore::new();

        assert_eq!(restore(&store, &snapshots, SNAPSHOT_KEY), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn persist_writes_once_per_change() {
        let snapshots = MemorySnapshots::new();
        let store = UserStore::new();
        persist(&store, Arc::new(snapshots.clone()), SNAPSHOT_KEY);

        store.add(UserRecord::bare("a"));
        store.add(UserRecord::bare("b"));
        store.delete(&UserKey::from("a"));
        store.delete(&UserKey::from("a")); // warning, no write

        assert_eq!(snapshots.writes(), 3);
        let saved = load_collection(&snapshots, SNAPSHOT_KEY).unwrap().unwrap();
        assert_eq!(saved, store.snapshot());
    }

    #[test]
    fn persist_failure_does_not_block_mutation() {
        let snapshots = MemorySnapshots::new();
        let store = UserStore::new();
        persist(&store, Arc::new(snapshots.clone()), SNAPSHOT_KEY);
        snapshots.fail_next_save("disk full");

        store.add(UserRecord::bare("a"));
        assert_eq!(store.len(), 1);
        assert_eq!(snapshots.writes(), 0);

        store.add(UserRecord::bare("b"));
        assert_eq!(snapshots.writes(), 1);
    }
}
