// Repository identifier extraction.
// Parses GitHub link targets into a canonical owner/repo pair.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::StarError;

/// Host token every repository link must contain.
const GITHUB_HOST: &str = "github.com";

/// Canonical identifier of a GitHub repository.
///
/// Owner and repo are kept exactly as written in the link; GitHub treats them
/// case-insensitively but the cache key does not fold case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

/// Matches `scheme://[www.]github.com/<owner>/<repo>[/anything]`.
///
/// Scheme and host are case-insensitive. Owner and repo stop at `/`,
/// whitespace, `#` and `?`, so fragments, queries and deeper paths are dropped.
fn repo_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i:https?://(?:www\.)?github\.com)/([^/\s#?]+)/([^/\s#?]+)")
            .expect("repository URL regex is valid")
    })
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Extract a repository identifier from a link target.
    ///
    /// Returns `None` for anything that is not a repository link. This is the
    /// normal negative result, not an error.
    pub fn from_url(url: &str) -> Option<Self> {
        let url = url.trim();
        if !url.to_ascii_lowercase().contains(GITHUB_HOST) {
            return None;
        }

        let caps = repo_url_regex().captures(url)?;
        let owner = &caps[1];
        let repo = caps[2].strip_suffix(".git").unwrap_or(&caps[2]);

        if repo.is_empty() {
            return None;
        }

        Some(Self::new(owner, repo))
    }

    /// Key used for the star count cache: `owner/repo`.
    pub fn cache_key(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Parses the `owner/repo` short form.
impl FromStr for RepoId {
    type Err = StarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StarError::Other(format!("not an owner/repo pair: {s:?}"));
        let (owner, repo) = s.trim().split_once('/').ok_or_else(invalid)?;
        let repo = repo.strip_suffix(".git").unwrap_or(repo);

        let valid_segment = |seg: &str| {
            !seg.is_empty()
                && !seg.contains(|c: char| matches!(c, '/' | '#' | '?') || c.is_whitespace())
        };
        if !valid_segment(owner) || !valid_segment(repo) {
            return Err(invalid());
        }

        Ok(Self::new(owner, repo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(owner: &str, repo: &str) -> Option<RepoId> {
        Some(RepoId::new(owner, repo))
    }

    #[test]
    fn test_equivalent_forms_yield_same_identifier() {
        let forms = [
            "https://github.com/rust-lang/rust",
            "http://github.com/rust-lang/rust",
            "https://www.github.com/rust-lang/rust",
            "https://github.com/rust-lang/rust/",
            "https://github.com/rust-lang/rust.git",
            "https://github.com/rust-lang/rust/tree/master/library",
            "https://github.com/rust-lang/rust#readme",
            "https://github.com/rust-lang/rust?tab=readme-ov-file",
            "http://www.github.com/rust-lang/rust.git/",
        ];

        for form in forms {
            assert_eq!(RepoId::from_url(form), id("rust-lang", "rust"), "{form}");
        }
    }

    #[test]
    fn test_host_and_scheme_case_insensitive() {
        assert_eq!(
            RepoId::from_url("HTTPS://GitHub.COM/Owner/Repo"),
            id("Owner", "Repo")
        );
    }

    #[test]
    fn test_owner_and_repo_case_preserved() {
        let parsed = RepoId::from_url("https://github.com/BurntSushi/ripgrep").unwrap();
        assert_eq!(parsed.cache_key(), "BurntSushi/ripgrep");
    }

    #[test]
    fn test_rejects_other_hosts() {
        assert_eq!(RepoId::from_url("https://gitlab.com/owner/repo"), None);
        assert_eq!(RepoId::from_url("https://example.com"), None);
        assert_eq!(RepoId::from_url(""), None);
    }

    #[test]
    fn test_rejects_missing_segments() {
        assert_eq!(RepoId::from_url("https://github.com/"), None);
        assert_eq!(RepoId::from_url("https://github.com/owner"), None);
        assert_eq!(RepoId::from_url("https://github.com/owner/"), None);
        assert_eq!(RepoId::from_url("https://github.com/?q=stars"), None);
        assert_eq!(RepoId::from_url("https://github.com/owner/.git"), None);
    }

    #[test]
    fn test_rejects_wrong_scheme() {
        assert_eq!(RepoId::from_url("ftp://github.com/owner/repo"), None);
        assert_eq!(RepoId::from_url("git@github.com:owner/repo.git"), None);
        assert_eq!(RepoId::from_url("github.com/owner/repo"), None);
    }

    #[test]
    fn test_rejects_github_subdomains() {
        assert_eq!(RepoId::from_url("https://owner.github.io/project"), None);
        assert_eq!(RepoId::from_url("https://gist.github.com/owner/abc123"), None);
    }

    #[test]
    fn test_strips_only_trailing_git() {
        assert_eq!(
            RepoId::from_url("https://github.com/owner/git.github.io"),
            id("owner", "git.github.io")
        );
        assert_eq!(
            RepoId::from_url("https://github.com/owner/repo.git.git"),
            id("owner", "repo.git")
        );
    }

    #[test]
    fn test_from_str_short_form() {
        assert_eq!("tokio-rs/tokio".parse::<RepoId>().ok(), id("tokio-rs", "tokio"));
        assert_eq!("tokio-rs/tokio.git".parse::<RepoId>().ok(), id("tokio-rs", "tokio"));
        assert!("tokio".parse::<RepoId>().is_err());
        assert!("/tokio".parse::<RepoId>().is_err());
        assert!("a/b/c".parse::<RepoId>().is_err());
    }

    #[test]
    fn test_display() {
        let repo = RepoId::new("octocat", "hello-world");
        assert_eq!(repo.to_string(), "octocat/hello-world");
    }
}
