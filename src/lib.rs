//! Cached GitHub star counts for repository links.
//!
//! Links are parsed into a [`RepoId`], counts are looked up through a
//! persistent [`CacheStore`] by the [`StarFetcher`], and rendered with
//! [`format_stars`]. Lookups never fail: rate limiting and transient errors
//! fall back to the last cached count.

pub mod cache;
pub mod document;
pub mod error;
pub mod fetcher;
pub mod format;
pub mod github;
pub mod settings;

pub use cache::{
    CacheEntry, CacheStore, FileStateStore, MemoryStateStore, PersistedState, StateStore,
};
pub use document::{Badge, BadgeSink, DocumentLink, DocumentRenderer, discover_links};
pub use error::{Result, SettingsError, StarError};
pub use fetcher::StarFetcher;
pub use format::{format_stars, format_unknown};
pub use github::{GitHubClient, RepoId};
pub use settings::{NumberFormat, Settings};
