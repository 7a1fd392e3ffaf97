// Cache module.
// Persistent star count cache and the storage port behind it.

pub mod paths;
pub mod persist;
pub mod store;

pub use paths::state_path;
pub use persist::{FileStateStore, MemoryStateStore, StateStore};
pub use store::{CacheEntry, CacheStore, PersistedState};
