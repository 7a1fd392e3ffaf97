// GitHub module.
// Link parsing plus the REST client used to look up star counts.

pub mod client;
pub mod identifier;
pub mod types;

pub use client::{GITHUB_API_BASE, GitHubClient};
pub use identifier::RepoId;
pub use types::RateLimit;
