// Document rendering.
// Finds repository links in a Markdown document and resolves a star badge for each.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::fetcher::StarFetcher;
use crate::format::{format_placeholder, format_stars, format_unknown};
use crate::github::RepoId;

/// A link found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    /// 1-based line number.
    pub line: usize,
    pub url: String,
}

/// A repository link together with its rendered count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub link: DocumentLink,
    pub repo: RepoId,
    /// `None` when the count could not be determined.
    pub stars: Option<u64>,
    pub text: String,
}

/// Receives badges as they are mounted and resolved.
pub trait BadgeSink {
    /// Called for every repository link before any count is fetched.
    fn placeholder(&mut self, link: &DocumentLink, repo: &RepoId, text: &str);

    /// Called once per link with the final text.
    fn resolved(&mut self, badge: &Badge);
}

/// Sink that ignores everything.
impl BadgeSink for () {
    fn placeholder(&mut self, _: &DocumentLink, _: &RepoId, _: &str) {}
    fn resolved(&mut self, _: &Badge) {}
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)https?://[^\s<>()\[\]"'`]+"#).expect("URL regex is valid")
    })
}

fn inline_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`[^`]*`").expect("inline code regex is valid"))
}

/// Every `http(s)` URL in the document, in order.
///
/// Markdown link targets are included. URLs inside fenced code blocks and
/// inline code spans are skipped, as is trailing sentence punctuation.
pub fn discover_links(text: &str) -> Vec<DocumentLink> {
    let mut links = Vec::new();
    let mut open_fence: Option<(char, usize)> = None;

    for (idx, line) in text.lines().enumerate() {
        let marker = fence_marker(line);
        match (open_fence, marker) {
            (None, Some(opened)) => {
                open_fence = Some(opened);
                continue;
            }
            (Some((ch, len)), Some((close_ch, close_len))) if ch == close_ch && close_len >= len => {
                open_fence = None;
                continue;
            }
            (Some(_), _) => continue,
            (None, None) => {}
        }

        let visible = inline_code_regex().replace_all(line, "");
        for m in url_regex().find_iter(&visible) {
            let url = m.as_str().trim_end_matches(['.', ',', ';', ':', '!']);
            links.push(DocumentLink {
                line: idx + 1,
                url: url.to_string(),
            });
        }
    }

    links
}

/// The fence character and run length if `line` opens or closes a code fence.
///
/// A fence is a run of at least three backticks or tildes. Only a run of the
/// same character, at least as long, closes it.
fn fence_marker(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start();
    let ch = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = trimmed.chars().take_while(|c| *c == ch).count();
    (len >= 3).then_some((ch, len))
}

/// Mounts and resolves star badges for every repository link in a document.
pub struct DocumentRenderer<'a> {
    fetcher: &'a StarFetcher,
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(fetcher: &'a StarFetcher) -> Self {
        Self { fetcher }
    }

    /// Render badges for the document.
    ///
    /// All placeholders are emitted first, then counts are fetched
    /// concurrently. Links that are not repository links are skipped.
    #[instrument(skip_all, fields(links = tracing::field::Empty))]
    pub async fn refresh(&self, text: &str, sink: &mut dyn BadgeSink) -> Vec<Badge> {
        let settings = self.fetcher.cache().settings();
        let placeholder = format_placeholder(&settings.display_format);

        let targets: Vec<(DocumentLink, RepoId)> = discover_links(text)
            .into_iter()
            .filter_map(|link| RepoId::from_url(&link.url).map(|repo| (link, repo)))
            .collect();
        tracing::Span::current().record("links", targets.len());

        for (link, repo) in &targets {
            sink.placeholder(link, repo, &placeholder);
        }

        let counts = futures::future::join_all(
            targets
                .iter()
                .map(|(_, repo)| self.fetcher.get_count(repo)),
        )
        .await;

        let badges: Vec<Badge> = targets
            .into_iter()
            .zip(counts)
            .map(|((link, repo), stars)| {
                let template = &settings.display_format;
                let text = match stars {
                    Some(n) => format_stars(n, settings.number_format, template),
                    None => format_unknown(template),
                };
                Badge {
                    link,
                    repo,
                    stars,
                    text,
                }
            })
            .collect();

        for badge in &badges {
            sink.resolved(badge);
        }
        debug!(badges = badges.len(), "document refreshed");

        badges
    }
}
