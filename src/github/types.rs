// GitHub API response types.
// Only the fields starcount reads from the repository endpoint.

use serde::Deserialize;

/// Subset of the `GET /repos/{owner}/{repo}` response.
///
/// `stargazers_count` stays a raw JSON value so a missing or non-numeric
/// field is reported as a malformed response rather than a decode error.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryStars {
    #[serde(default)]
    pub stargazers_count: Option<serde_json::Value>,
}

impl RepositoryStars {
    /// The star count, if present and a non-negative integer.
    pub fn stars(&self) -> Option<u64> {
        self.stargazers_count.as_ref().and_then(|v| v.as_u64())
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    /// Reset time in epoch seconds.
    pub reset: u64,
}
