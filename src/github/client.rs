// GitHub API HTTP client.
// Handles authentication, rate limit headers, and response classification.

use std::sync::Mutex;

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::debug;

use crate::error::{Result, StarError};

use super::identifier::RepoId;
use super::types::{RateLimit, RepositoryStars};

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const CLIENT_ID: &str = concat!("starcount/", env!("CARGO_PKG_VERSION"));

const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// GitHub API client with optional token authentication and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a client for `base_url`. An empty token means unauthenticated.
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("token {}", token))
                    .map_err(|e| StarError::Other(e.to_string()))?,
            );
        }
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_ID));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Most recently observed rate limit headers.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .map(|rl| rl.clone())
            .unwrap_or_default()
    }

    /// Fetch the star count of a repository.
    ///
    /// Rate limiting is detected from headers before the status is inspected,
    /// since GitHub answers an exhausted quota with 403 or 429.
    pub async fn get_repo_stars(&self, repo: &RepoId) -> Result<u64> {
        let url = format!("{}/repos/{}/{}", self.base_url, repo.owner, repo.repo);
        let response = self.client.get(&url).send().await?;

        self.update_rate_limit(&response);
        if let Some(reset_at) = rate_limited_until(&response) {
            return Err(StarError::RateLimited { reset_at });
        }

        let response = check_response(response, repo)?;
        let body = response.text().await?;
        let parsed: RepositoryStars = serde_json::from_str(&body)
            .map_err(|e| StarError::MalformedResponse(e.to_string()))?;

        let stars = parsed.stars().ok_or_else(|| {
            StarError::MalformedResponse("missing numeric stargazers_count".to_string())
        })?;
        debug!(repo = %repo, stars, "fetched star count");
        Ok(stars)
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let Ok(mut rate_limit) = self.rate_limit.lock() else {
            return;
        };

        if let Some(limit) = header_u64(response, RATE_LIMIT_LIMIT) {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header_u64(response, RATE_LIMIT_REMAINING) {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header_u64(response, RATE_LIMIT_RESET) {
            rate_limit.reset = reset;
        }
    }
}

fn header_str<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

fn header_u64(response: &Response, name: &str) -> Option<u64> {
    header_str(response, name).and_then(|v| v.trim().parse().ok())
}

/// Returns the formatted reset time when the quota is exhausted.
///
/// Only an exact `"0"` remaining together with a reset header counts.
fn rate_limited_until(response: &Response) -> Option<String> {
    if header_str(response, RATE_LIMIT_REMAINING) != Some("0") {
        return None;
    }
    let reset = header_str(response, RATE_LIMIT_RESET)?;

    let reset_at = reset
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| reset.to_string());
    Some(reset_at)
}

/// Check response status and convert errors.
fn check_response(response: Response, repo: &RepoId) -> Result<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(StarError::NotFound(repo.to_string())),
        status => Err(StarError::Status(status.as_u16())),
    }
}
