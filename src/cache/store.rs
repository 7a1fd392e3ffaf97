// Star count cache store.
// In-memory map of owner/repo to star counts, flushed through a StateStore on every change.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SettingsError};
use crate::settings::Settings;

use super::persist::StateStore;

/// A star count observed at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub stars: u64,
    /// When the count was fetched. Stored as epoch milliseconds.
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub observed_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(stars: u64, observed_at: DateTime<Utc>) -> Self {
        Self { stars, observed_at }
    }

    /// Fresh while `now - observed_at < expiry`. Stale entries are kept, not evicted.
    pub fn is_fresh(&self, now: DateTime<Utc>, expiry: chrono::Duration) -> bool {
        now.signed_duration_since(self.observed_at) < expiry
    }
}

/// The persisted blob: settings flattened alongside the cache map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(flatten)]
    pub settings: Settings,
    #[serde(default, deserialize_with = "lenient_cache")]
    pub cache: BTreeMap<String, CacheEntry>,
}

/// Decode the cache map entry by entry, dropping entries that do not parse.
fn lenient_cache<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, CacheEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let serde_json::Value::Object(raw) = serde_json::Value::deserialize(deserializer)? else {
        warn!("persisted star cache is not a map, starting empty");
        return Ok(BTreeMap::new());
    };

    let cache = raw
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
            Ok(entry) => Some((key, entry)),
            Err(e) => {
                warn!(key, error = %e, "dropping unreadable cache entry");
                None
            }
        })
        .collect();
    Ok(cache)
}

/// Shared cache of star counts plus the settings persisted with it.
///
/// The lock is only held for in-memory reads and writes, never across an
/// await. Saves are serialized so the file always ends with the latest state.
pub struct CacheStore {
    state: Mutex<PersistedState>,
    persistence: Arc<dyn StateStore>,
    save_lock: tokio::sync::Mutex<()>,
}

impl CacheStore {
    /// Load the persisted state once, at startup.
    pub async fn open(persistence: Arc<dyn StateStore>) -> Result<Self> {
        let mut state = persistence.load().await?;
        for problem in state.settings.repair() {
            warn!(error = %problem, "persisted setting is invalid, using default");
        }
        debug!(entries = state.cache.len(), "loaded star cache");
        Ok(Self::with_state(state, persistence))
    }

    /// Start from an already loaded state.
    pub fn with_state(state: PersistedState, persistence: Arc<dyn StateStore>) -> Self {
        Self {
            state: Mutex::new(state),
            persistence,
            save_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PersistedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn settings(&self) -> Settings {
        self.lock().settings.clone()
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.lock().cache.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().cache.is_empty()
    }

    /// All cached entries, ordered by key.
    pub fn entries(&self) -> Vec<(String, CacheEntry)> {
        self.lock()
            .cache
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    /// Store a freshly fetched count and persist.
    ///
    /// A failed save is logged and swallowed; the in-memory entry stands.
    pub async fn record(&self, key: &str, entry: CacheEntry) {
        self.lock().cache.insert(key.to_string(), entry);

        if let Err(e) = self.flush().await {
            warn!(key, error = %e, "failed to persist star cache");
        }
    }

    /// Drop every cached count and persist.
    pub async fn clear(&self) -> Result<usize> {
        let removed = {
            let mut state = self.lock();
            let removed = state.cache.len();
            state.cache.clear();
            removed
        };
        debug!(removed, "cleared star cache");
        self.flush().await?;
        Ok(removed)
    }

    /// Apply a settings change, validate it, and persist.
    ///
    /// Nothing changes if `update` or validation fails.
    pub async fn update_settings<F>(&self, update: F) -> Result<Settings>
    where
        F: FnOnce(&mut Settings) -> std::result::Result<(), SettingsError>,
    {
        let settings = {
            let mut state = self.lock();
            let mut settings = state.settings.clone();
            update(&mut settings)?;
            settings.validate()?;
            state.settings = settings.clone();
            settings
        };
        self.flush().await?;
        Ok(settings)
    }

    /// Persist the current state.
    pub async fn flush(&self) -> Result<()> {
        let _guard = self.save_lock.lock().await;
        let snapshot = self.lock().clone();
        self.persistence.save(&snapshot).await
    }
}
