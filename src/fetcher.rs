// Star count fetcher.
// Serves fresh cache hits, otherwise asks GitHub and falls back to stale data on failure.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStore};
use crate::error::StarError;
use crate::github::{GitHubClient, RepoId};

/// Resolves star counts through the shared cache.
///
/// Concurrent lookups of the same repository are not coalesced: each one that
/// misses the cache makes its own request, and both write the same entry.
pub struct StarFetcher {
    client: GitHubClient,
    cache: Arc<CacheStore>,
}

impl StarFetcher {
    pub fn new(client: GitHubClient, cache: Arc<CacheStore>) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    /// Star count for `repo`, or `None` when it is unknown.
    pub async fn get_count(&self, repo: &RepoId) -> Option<u64> {
        self.get_count_at(repo, Utc::now()).await
    }

    /// [`get_count`](Self::get_count) with an explicit clock.
    ///
    /// Never fails: transient errors resolve to the stale cached count when
    /// there is one. A 404 is authoritative and always yields `None`.
    pub async fn get_count_at(&self, repo: &RepoId, now: DateTime<Utc>) -> Option<u64> {
        let key = repo.cache_key();
        let expiry = self.cache.settings().expiry();
        let cached = self.cache.get(&key);

        if let Some(entry) = cached.filter(|e| e.is_fresh(now, expiry)) {
            debug!(repo = %key, stars = entry.stars, "star cache hit");
            return Some(entry.stars);
        }

        let stale = cached.map(|e| e.stars);
        match self.client.get_repo_stars(repo).await {
            Ok(stars) => {
                self.cache.record(&key, CacheEntry::new(stars, now)).await;
                Some(stars)
            }
            Err(StarError::NotFound(_)) => {
                debug!(repo = %key, "repository not found");
                None
            }
            Err(StarError::RateLimited { reset_at }) => {
                info!(
                    repo = %key,
                    reset_at = %reset_at,
                    stale = ?stale,
                    "GitHub rate limit exhausted, serving cached count"
                );
                stale
            }
            Err(e) => {
                warn!(repo = %key, error = %e, stale = ?stale, "star count lookup failed");
                stale
            }
        }
    }
}
