// Persistence port for the settings and cache blob.
// File-backed store for real use, in-memory store for tests and embedding.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, StarError};

use super::store::PersistedState;

/// Load/save interface for the persisted state blob.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the whole blob. A store with nothing saved yet yields the default state.
    async fn load(&self) -> Result<PersistedState>;

    /// Replace the stored blob.
    async fn save(&self, state: &PersistedState) -> Result<()>;
}

/// Stores the blob as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<PersistedState> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PersistedState::default());
            }
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(PersistedState::default());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(state)?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &self.path).await?;

        Ok(())
    }
}

/// Keeps the blob in memory and counts saves.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<PersistedState>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryStateStore {
    pub fn new(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    /// Last saved (or initial) state.
    pub fn snapshot(&self) -> PersistedState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make every following save fail with an IO error.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<PersistedState> {
        Ok(self.snapshot())
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StarError::Io(std::io::Error::other("save disabled")));
        }
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::CacheEntry;
    use crate::settings::NumberFormat;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStateStore::new(temp_dir.path().join("data.json"));

        let state = store.load().await.unwrap();
        assert_eq!(state, PersistedState::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("data.json");
        let store = FileStateStore::new(&path);

        let mut state = PersistedState::default();
        state.settings.number_format = NumberFormat::Full;
        state.cache.insert(
            "a/b".to_string(),
            CacheEntry::new(7, Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()),
        );

        store.save(&state).await.unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, state);
    }

    #[tokio::test]
    async fn test_load_corrupt_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileStateStore::new(&path);
        assert!(matches!(store.load().await, Err(StarError::Json(_))));
    }

    #[tokio::test]
    async fn test_memory_store_counts_and_fails_saves() {
        let store = MemoryStateStore::default();
        store.save(&PersistedState::default()).await.unwrap();
        assert_eq!(store.save_count(), 1);

        store.fail_saves(true);
        assert!(store.save(&PersistedState::default()).await.is_err());
        assert_eq!(store.save_count(), 1);
    }
}
