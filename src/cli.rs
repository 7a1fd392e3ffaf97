//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cached GitHub star counts for repository links
#[derive(Debug, Parser)]
#[command(name = "starcount")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the state file holding settings and cached counts
    ///
    /// Defaults to data.json in the platform data directory.
    #[arg(long, global = true, value_name = "FILE", env = "STARCOUNT_STATE")]
    pub state: Option<PathBuf>,

    /// GitHub token for this run, overriding the stored api-token
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API base URL
    #[arg(long, global = true, default_value = starcount::github::GITHUB_API_BASE)]
    pub api_url: String,

    /// Logging level
    ///
    /// Valid values: trace, debug, info, warn, error
    #[arg(short, long, global = true, default_value = "warn", env = "STARCOUNT_LOG")]
    pub log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true, env = "STARCOUNT_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve star badges for every repository link in a Markdown document
    Refresh {
        /// Document to scan
        file: PathBuf,
    },
    /// Look up star counts for repository URLs or owner/repo pairs
    Lookup {
        #[arg(required = true)]
        repos: Vec<String>,
    },
    /// Empty the star count cache
    ClearCache,
    /// Show cached entries and their freshness
    Status,
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print current settings
    Show,
    /// Change a setting: cache-expiry, display-format, number-format, api-token
    Set { key: String, value: String },
}
