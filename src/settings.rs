// User settings.
// Four persisted options with defaults and validation.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::SettingsError;

/// Placeholder substituted with the formatted star count.
pub const STARS_PLACEHOLDER: &str = "{stars}";

pub const DEFAULT_CACHE_EXPIRY_MINUTES: u64 = 60;
pub const DEFAULT_DISPLAY_FORMAT: &str = "⭐ {stars}";

/// How star counts are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    /// Comma-grouped integer, e.g. `12,345`.
    Full,
    /// Compact form, e.g. `12k` or `1.2M`.
    #[default]
    Abbreviated,
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberFormat::Full => f.write_str("full"),
            NumberFormat::Abbreviated => f.write_str("abbreviated"),
        }
    }
}

impl FromStr for NumberFormat {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(NumberFormat::Full),
            "abbreviated" => Ok(NumberFormat::Abbreviated),
            other => Err(SettingsError::UnknownNumberFormat(other.to_string())),
        }
    }
}

/// Persisted settings. Field names match the stored JSON blob.
///
/// Decoding is per field: a missing or mistyped value falls back to its
/// default without discarding the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawSettings")]
pub struct Settings {
    /// Minutes a cached count stays fresh.
    pub cache_expiry: u64,
    pub display_format: String,
    pub api_token: String,
    pub number_format: NumberFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_expiry: DEFAULT_CACHE_EXPIRY_MINUTES,
            display_format: DEFAULT_DISPLAY_FORMAT.to_string(),
            api_token: String::new(),
            number_format: NumberFormat::default(),
        }
    }
}

/// Settings as found in the blob, before each field is checked.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSettings {
    cache_expiry: Option<Value>,
    display_format: Option<Value>,
    api_token: Option<Value>,
    number_format: Option<Value>,
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        let defaults = Settings::default();
        Self {
            cache_expiry: field_or("cacheExpiry", raw.cache_expiry, defaults.cache_expiry),
            display_format: field_or("displayFormat", raw.display_format, defaults.display_format),
            api_token: field_or("apiToken", raw.api_token, defaults.api_token),
            number_format: field_or("numberFormat", raw.number_format, defaults.number_format),
        }
    }
}

fn field_or<T: DeserializeOwned>(name: &str, value: Option<Value>, default: T) -> T {
    match value {
        None | Some(Value::Null) => default,
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(field = name, error = %e, "ignoring mistyped persisted setting");
            default
        }),
    }
}

impl Settings {
    /// Freshness window for cached counts.
    pub fn expiry(&self) -> chrono::Duration {
        let max_minutes = i64::MAX / 60_000;
        let minutes = i64::try_from(self.cache_expiry).unwrap_or(max_minutes);
        chrono::Duration::minutes(minutes.min(max_minutes))
    }

    /// Configured token, if any.
    pub fn token(&self) -> Option<&str> {
        Some(self.api_token.trim()).filter(|t| !t.is_empty())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.cache_expiry == 0 {
            return Err(SettingsError::InvalidExpiry("0".to_string()));
        }
        if !self.display_format.contains(STARS_PLACEHOLDER) {
            return Err(SettingsError::MissingPlaceholder);
        }
        Ok(())
    }

    /// Reset every invalid field to its default, returning what was wrong.
    pub fn repair(&mut self) -> Vec<SettingsError> {
        let mut problems = Vec::new();
        if self.cache_expiry == 0 {
            problems.push(SettingsError::InvalidExpiry("0".to_string()));
            self.cache_expiry = DEFAULT_CACHE_EXPIRY_MINUTES;
        }
        if !self.display_format.contains(STARS_PLACEHOLDER) {
            problems.push(SettingsError::MissingPlaceholder);
            self.display_format = DEFAULT_DISPLAY_FORMAT.to_string();
        }
        problems
    }

    /// Set a value by its user-facing key, validating before applying.
    ///
    /// Keys: `cache-expiry`, `display-format`, `number-format`, `api-token`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut updated = self.clone();
        match key {
            "cache-expiry" => {
                updated.cache_expiry = value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|m| *m > 0)
                    .ok_or_else(|| SettingsError::InvalidExpiry(value.to_string()))?;
            }
            "display-format" => updated.display_format = value.to_string(),
            "number-format" => updated.number_format = value.parse()?,
            "api-token" => updated.api_token = value.trim().to_string(),
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Key/value pairs for display, with the token masked.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let token = if self.token().is_some() {
            "********".to_string()
        } else {
            "(not set)".to_string()
        };
        vec![
            ("cache-expiry", self.cache_expiry.to_string()),
            ("display-format", self.display_format.clone()),
            ("number-format", self.number_format.to_string()),
            ("api-token", token),
        ]
    }
}
