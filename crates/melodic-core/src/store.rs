//! Generic write-through persisted store.
//!
//! A `PersistedStore<S>` owns one state value, publishes it through a
//! `watch` channel and mirrors it to a `Storage` backend under `S::KEY`.
//!
//! Snapshot format (JSON):
//!
//!   { "version": <S::VERSION>, "state": { ...camelCase fields... } }
//!
//! Unknown fields are ignored and missing fields take their defaults. A
//! snapshot that cannot be read, decoded, has another schema version or breaks
//! the state's invariants is discarded and the store starts from defaults.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

// ── State contract ────────────────────────────────────────────────────────────

pub trait PersistedState:
    Serialize + DeserializeOwned + Default + Clone + PartialEq + Send + Sync + 'static
{
    /// Durable storage key. Must be unique per state type.
    const KEY: &'static str;

    /// Bump when the snapshot layout changes incompatibly.
    const VERSION: u32 = 0;

    /// Cross-field invariants checked on rehydration.
    fn is_consistent(&self) -> bool {
        true
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write snapshot `{key}`: {source}")]
    Persist {
        key: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode snapshot `{key}`: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid user: {0}")]
    InvalidUser(String),
}

/// Why a durable snapshot was rejected during rehydration.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("unreadable: {0}")]
    Unreadable(#[from] io::Error),
    #[error("undecodable: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("schema version {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("state invariants violated")]
    Inconsistent,
}

// ── Storage backends ──────────────────────────────────────────────────────────

#[async_trait]
pub trait Storage: Send + Sync {
    /// `Ok(None)` when nothing is stored under `key`.
    async fn load(&self, key: &str) -> io::Result<Option<String>>;
    async fn save(&self, key: &str, value: &str) -> io::Result<()>;
    /// Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> io::Result<()>;
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn load(&self, key: &str) -> io::Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Writes a temp file, syncs it and renames it over the old snapshot so a
    /// crash mid-write leaves the previous snapshot intact.
    async fn save(&self, key: &str, value: &str) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        let mut f = tokio::fs::File::create(&tmp).await?;
        f.write_all(value.as_bytes()).await?;
        f.sync_all().await?;
        drop(f);

        tokio::fs::rename(&tmp, &path).await
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// In-process storage, for tests and sessions that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: std::sync::Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: impl Into<String>) {
        self.lock().insert(key.to_string(), value.into());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, value: &str) -> io::Result<()> {
        self.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> io::Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

// ── Snapshot envelope ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SnapshotRef<'a, S> {
    version: u32,
    state: &'a S,
}

#[derive(Deserialize)]
struct Snapshot<S> {
    #[serde(default)]
    version: u32,
    state: S,
}

pub fn encode_snapshot<S: PersistedState>(state: &S) -> Result<String, StoreError> {
    serde_json::to_string_pretty(&SnapshotRef {
        version: S::VERSION,
        state,
    })
    .map_err(|source| StoreError::Encode { key: S::KEY, source })
}

pub fn decode_snapshot<S: PersistedState>(raw: &str) -> Result<S, SnapshotError> {
    let snapshot: Snapshot<S> = serde_json::from_str(raw)?;
    if snapshot.version != S::VERSION {
        return Err(SnapshotError::VersionMismatch {
            found: snapshot.version,
            expected: S::VERSION,
        });
    }
    if !snapshot.state.is_consistent() {
        return Err(SnapshotError::Inconsistent);
    }
    Ok(snapshot.state)
}

// ── PersistedStore ────────────────────────────────────────────────────────────

pub struct PersistedStore<S: PersistedState> {
    tx: watch::Sender<S>,
    storage: Arc<dyn Storage>,
    /// Serializes mutations so each one writes its snapshot before the next starts.
    write_lock: Mutex<()>,
}

impl<S: PersistedState> PersistedStore<S> {
    /// Rehydrate from `storage`, falling back to `S::default()`. Never fails.
    pub async fn open(storage: Arc<dyn Storage>) -> Self {
        let state = rehydrate::<S>(storage.as_ref()).await;
        let (tx, _rx) = watch::channel(state);
        Self {
            tx,
            storage,
            write_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &'static str {
        S::KEY
    }

    /// Latest completed state.
    pub fn get_state(&self) -> S {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    /// Apply `f` to a copy of the state, write the snapshot, then publish.
    ///
    /// A mutation that leaves the state unchanged is a no-op. If the write
    /// fails, the published state is left as it was.
    pub async fn mutate<F>(&self, op: &str, f: F) -> Result<S, StoreError>
    where
        F: FnOnce(&mut S) + Send,
    {
        let _guard = self.write_lock.lock().await;

        let mut next = self.get_state();
        f(&mut next);

        let unchanged = *self.tx.borrow() == next;
        if unchanged {
            debug!("[store:{}] {}: no change", S::KEY, op);
            return Ok(next);
        }

        let encoded = encode_snapshot(&next)?;
        self.storage
            .save(S::KEY, &encoded)
            .await
            .map_err(|source| {
                warn!("[store:{}] {}: snapshot write failed: {}", S::KEY, op, source);
                StoreError::Persist { key: S::KEY, source }
            })?;

        self.tx.send_replace(next.clone());
        debug!("[store:{}] {}: applied", S::KEY, op);
        Ok(next)
    }

    /// Back to defaults (still written through).
    pub async fn reset(&self) -> Result<S, StoreError> {
        self.mutate("reset", |s| *s = S::default()).await
    }
}

async fn rehydrate<S: PersistedState>(storage: &dyn Storage) -> S {
    let raw = match storage.load(S::KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("[store:{}] no snapshot, starting from defaults", S::KEY);
            return S::default();
        }
        Err(e) => {
            warn!("[store:{}] snapshot {}; starting from defaults", S::KEY, SnapshotError::from(e));
            return S::default();
        }
    };

    match decode_snapshot::<S>(&raw) {
        Ok(state) => {
            info!("[store:{}] rehydrated snapshot (v{})", S::KEY, S::VERSION);
            state
        }
        Err(e) => {
            warn!("[store:{}] discarding snapshot: {}", S::KEY, e);
            if let Err(e) = storage.remove(S::KEY).await {
                warn!("[store:{}] could not remove discarded snapshot: {}", S::KEY, e);
            }
            S::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Counter {
        #[serde(default)]
        value: u32,
        #[serde(default)]
        label: String,
    }

    impl PersistedState for Counter {
        const KEY: &'static str = "test-counter";
        const VERSION: u32 = 2;

        fn is_consistent(&self) -> bool {
            self.value < 1000
        }
    }

    /// Counts writes and can be switched to fail them.
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail: AtomicBool,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl Storage for FlakyStorage {
        async fn load(&self, key: &str) -> io::Result<Option<String>> {
            self.inner.load(key).await
        }

        async fn save(&self, key: &str, value: &str) -> io::Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(key, value).await
        }

        async fn remove(&self, key: &str) -> io::Result<()> {
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn test_mutation_writes_through() {
        let storage = Arc::new(MemoryStorage::new());
        let store = PersistedStore::<Counter>::open(storage.clone()).await;

        store.mutate("bump", |c| c.value = 7).await.unwrap();

        let raw = storage.get("test-counter").unwrap();
        let snapshot: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(snapshot["version"], 2);
        assert_eq!(snapshot["state"]["value"], 7);

        let reopened = PersistedStore::<Counter>::open(storage).await;
        assert_eq!(reopened.get_state().value, 7);
    }

    #[tokio::test]
    async fn test_noop_mutation_skips_write() {
        let storage = Arc::new(FlakyStorage::default());
        let store = PersistedStore::<Counter>::open(storage.clone()).await;

        store.mutate("set", |c| c.value = 1).await.unwrap();
        store.mutate("set", |c| c.value = 1).await.unwrap();
        assert_eq!(storage.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_unchanged() {
        let storage = Arc::new(FlakyStorage::default());
        let store = PersistedStore::<Counter>::open(storage.clone()).await;
        store.mutate("set", |c| c.value = 1).await.unwrap();

        storage.fail.store(true, Ordering::SeqCst);
        let err = store.mutate("set", |c| c.value = 2).await.unwrap_err();
        assert!(matches!(err, StoreError::Persist { key: "test-counter", .. }));
        assert_eq!(store.get_state().value, 1);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_falls_back_and_is_removed() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert("test-counter", "{ not json");

        let store = PersistedStore::<Counter>::open(storage.clone()).await;
        assert_eq!(store.get_state(), Counter::default());
        assert!(storage.get("test-counter").is_none());
    }

    #[tokio::test]
    async fn test_version_mismatch_falls_back() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert("test-counter", r#"{"version":1,"state":{"value":3}}"#);
        let store = PersistedStore::<Counter>::open(storage).await;
        assert_eq!(store.get_state().value, 0);
    }

    #[tokio::test]
    async fn test_inconsistent_snapshot_falls_back() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert("test-counter", r#"{"version":2,"state":{"value":5000}}"#);
        let store = PersistedStore::<Counter>::open(storage).await;
        assert_eq!(store.get_state().value, 0);
    }

    #[tokio::test]
    async fn test_unknown_and_missing_fields_are_tolerated() {
        let storage = Arc::new(MemoryStorage::new());
        storage.insert(
            "test-counter",
            r#"{"version":2,"state":{"value":9,"addedLater":true}}"#,
        );
        let store = PersistedStore::<Counter>::open(storage).await;
        assert_eq!(store.get_state(), Counter { value: 9, label: String::new() });
    }

    #[tokio::test]
    async fn test_subscribers_see_completed_mutations() {
        let store = PersistedStore::<Counter>::open(Arc::new(MemoryStorage::new())).await;
        let mut rx = store.subscribe();

        store
            .mutate("rename", |c| {
                c.value = 4;
                c.label = "four".into();
            })
            .await
            .unwrap();

        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen, Counter { value: 4, label: "four".into() });
    }

    #[tokio::test]
    async fn test_concurrent_mutations_do_not_lose_updates() {
        let storage = Arc::new(MemoryStorage::new());
        let store = Arc::new(PersistedStore::<Counter>::open(storage.clone()).await);

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.mutate("inc", |c| c.value += 1).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(store.get_state().value, 50);
        let reopened = PersistedStore::<Counter>::open(storage).await;
        assert_eq!(reopened.get_state().value, 50);
    }

    #[tokio::test]
    async fn test_file_storage_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("store"));

        assert!(storage.load("k").await.unwrap().is_none());
        storage.save("k", "one").await.unwrap();
        storage.save("k", "two").await.unwrap();
        assert_eq!(storage.load("k").await.unwrap().as_deref(), Some("two"));
        assert!(storage.path_for("k").ends_with("k.json"));

        storage.remove("k").await.unwrap();
        storage.remove("k").await.unwrap();
        assert!(storage.load("k").await.unwrap().is_none());
    }
}
