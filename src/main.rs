//! starcount - cached GitHub star counts for repository links.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use starcount::{
    Badge, BadgeSink, CacheStore, DocumentLink, DocumentRenderer, FileStateStore, GitHubClient,
    RepoId, StarFetcher, format_stars, format_unknown,
};

mod cli;
mod logging;

use cli::{Args, Command, ConfigAction};

/// Prints loading placeholders to stderr and final badges to stdout.
struct TerminalSink {
    progress: bool,
}

impl BadgeSink for TerminalSink {
    fn placeholder(&mut self, link: &DocumentLink, repo: &RepoId, text: &str) {
        if self.progress {
            eprintln!("{:>4}  {:<40} {}", link.line, repo.to_string(), text);
        }
    }

    fn resolved(&mut self, badge: &Badge) {
        println!(
            "{:>4}  {:<40} {}",
            badge.link.line,
            badge.repo.to_string(),
            badge.text
        );
    }
}

// Counts are fetched cooperatively on one thread; the cache lock is never
// contended across tasks.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init(&args.log_level, args.log_json)?;

    let state_path = match &args.state {
        Some(path) => path.clone(),
        None => starcount::cache::state_path()
            .context("could not determine a data directory, pass --state")?,
    };
    tracing::debug!(path = %state_path.display(), "opening state");

    let persistence = Arc::new(FileStateStore::new(&state_path));
    let cache = Arc::new(
        CacheStore::open(persistence)
            .await
            .with_context(|| format!("failed to load state from {}", state_path.display()))?,
    );

    match &args.command {
        Command::Refresh { file } => {
            let fetcher = fetcher(&args, cache)?;
            refresh(&fetcher, file).await
        }
        Command::Lookup { repos } => {
            let fetcher = fetcher(&args, cache)?;
            lookup(&fetcher, repos).await
        }
        Command::ClearCache => {
            let removed = cache.clear().await.context("failed to save cleared cache")?;
            println!("Cleared {removed} cached star counts");
            Ok(())
        }
        Command::Status => {
            status(&cache);
            Ok(())
        }
        Command::Config { action } => match action {
            ConfigAction::Show => {
                for (key, value) in cache.settings().entries() {
                    println!("{key:<16} {value}");
                }
                Ok(())
            }
            ConfigAction::Set { key, value } => {
                cache
                    .update_settings(|s| s.set(key, value))
                    .await
                    .with_context(|| format!("failed to set {key}"))?;
                println!("{key} updated");
                Ok(())
            }
        },
    }
}

fn fetcher(args: &Args, cache: Arc<CacheStore>) -> Result<StarFetcher> {
    let settings = cache.settings();
    let token = args
        .token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .or(settings.token());
    let client = GitHubClient::new(&args.api_url, token).context("failed to build HTTP client")?;
    Ok(StarFetcher::new(client, cache))
}

async fn refresh(fetcher: &StarFetcher, file: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let mut sink = TerminalSink {
        progress: std::io::stderr().is_terminal(),
    };
    let badges = DocumentRenderer::new(fetcher).refresh(&text, &mut sink).await;

    if badges.is_empty() {
        eprintln!("No repository links found in {}", file.display());
    }
    Ok(())
}

async fn lookup(fetcher: &StarFetcher, inputs: &[String]) -> Result<()> {
    let mut repos = Vec::with_capacity(inputs.len());
    for input in inputs {
        match RepoId::from_url(input).map(Ok).unwrap_or_else(|| input.parse()) {
            Ok(repo) => repos.push(repo),
            Err(_) => eprintln!("skipping {input}: not a GitHub repository"),
        }
    }
    if repos.is_empty() {
        bail!("no GitHub repositories to look up");
    }

    let settings = fetcher.cache().settings();
    let counts = futures::future::join_all(repos.iter().map(|r| fetcher.get_count(r))).await;
    for (repo, stars) in repos.iter().zip(counts) {
        let text = match stars {
            Some(n) => format_stars(n, settings.number_format, &settings.display_format),
            None => format_unknown(&settings.display_format),
        };
        println!("{:<40} {}", repo.to_string(), text);
    }
    Ok(())
}

fn status(cache: &CacheStore) {
    let settings = cache.settings();
    let expiry = settings.expiry();
    let now = Utc::now();

    println!(
        "{} cached repositories, expiry {} minutes",
        cache.len(),
        settings.cache_expiry
    );
    for (key, entry) in cache.entries() {
        let age = now.signed_duration_since(entry.observed_at).num_minutes();
        let freshness = if entry.is_fresh(now, expiry) {
            "fresh"
        } else {
            "stale"
        };
        println!("{key:<40} {:>10}  {age:>6}m  {freshness}", entry.stars);
    }
}
