// Error types for starcount.
// Covers GitHub API failures, settings validation and state persistence.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StarError {
    #[error("GitHub API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("GitHub API returned HTTP {0}")]
    Status(u16),

    #[error("Unexpected response body: {0}")]
    MalformedResponse(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Rejected settings values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("display format must contain the {{stars}} placeholder")]
    MissingPlaceholder,

    #[error("cache expiry must be a positive number of minutes, got {0}")]
    InvalidExpiry(String),

    #[error("unknown number format {0:?}, expected \"full\" or \"abbreviated\"")]
    UnknownNumberFormat(String),

    #[error("unknown setting {0:?}")]
    UnknownKey(String),
}

pub type Result<T> = std::result::Result<T, StarError>;
