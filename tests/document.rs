use std::sync::Arc;

use starcount::{
    Badge, BadgeSink, CacheStore, DocumentLink, DocumentRenderer, GitHubClient, MemoryStateStore,
    NumberFormat, PersistedState, RepoId, StarFetcher,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingSink {
    placeholders: Vec<(usize, String, String)>,
    resolved: Vec<String>,
}

impl BadgeSink for RecordingSink {
    fn placeholder(&mut self, link: &DocumentLink, repo: &RepoId, text: &str) {
        assert!(self.resolved.is_empty(), "placeholders come first");
        self.placeholders
            .push((link.line, repo.to_string(), text.to_string()));
    }

    fn resolved(&mut self, badge: &Badge) {
        self.resolved.push(badge.text.clone());
    }
}

async fn mount_stars(server: &MockServer, repo_path: &str, stars: u64) {
    Mock::given(method("GET"))
        .and(path(repo_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "stargazers_count": stars })),
        )
        .mount(server)
        .await;
}

async fn fetcher(server: &MockServer, state: PersistedState) -> StarFetcher {
    let persistence = Arc::new(MemoryStateStore::new(state));
    let cache = Arc::new(CacheStore::open(persistence).await.unwrap());
    StarFetcher::new(GitHubClient::new(&server.uri(), None).unwrap(), cache)
}

const DOCUMENT: &str = "\
# Reading list

- [ripgrep](https://github.com/BurntSushi/ripgrep)
- [fd](https://www.github.com/sharkdp/fd.git) and the [docs](https://example.com/fd)
- gone: https://github.com/someone/deleted

```sh
git clone https://github.com/BurntSushi/ripgrep
```
";

#[tokio::test]
async fn test_refresh_renders_every_repository_link() {
    let server = MockServer::start().await;
    mount_stars(&server, "/repos/BurntSushi/ripgrep", 45_678).await;
    mount_stars(&server, "/repos/sharkdp/fd", 999).await;
    Mock::given(method("GET"))
        .and(path("/repos/someone/deleted"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, PersistedState::default()).await;
    let mut sink = RecordingSink::default();

    let badges = DocumentRenderer::new(&fetcher)
        .refresh(DOCUMENT, &mut sink)
        .await;

    assert_eq!(
        sink.placeholders,
        vec![
            (3, "BurntSushi/ripgrep".to_string(), "⭐ …".to_string()),
            (4, "sharkdp/fd".to_string(), "⭐ …".to_string()),
            (5, "someone/deleted".to_string(), "⭐ …".to_string()),
        ]
    );
    assert_eq!(sink.resolved, vec!["⭐ 46k", "⭐ 999", "⭐ ?"]);

    assert_eq!(badges.len(), 3);
    assert_eq!(badges[0].stars, Some(45_678));
    assert_eq!(badges[2].stars, None);
    assert_eq!(fetcher.cache().len(), 2);
}

#[tokio::test]
async fn test_refresh_uses_configured_format() {
    let server = MockServer::start().await;
    mount_stars(&server, "/repos/BurntSushi/ripgrep", 1234).await;

    let mut state = PersistedState::default();
    state.settings.number_format = NumberFormat::Full;
    state.settings.display_format = "({stars} stars)".to_string();
    let fetcher = fetcher(&server, state).await;

    let badges = DocumentRenderer::new(&fetcher)
        .refresh("https://github.com/BurntSushi/ripgrep", &mut ())
        .await;

    assert_eq!(badges.len(), 1);
    assert_eq!(badges[0].text, "(1,234 stars)");
}

#[tokio::test]
async fn test_duplicate_links_each_resolve() {
    let server = MockServer::start().await;
    mount_stars(&server, "/repos/a/b", 50).await;

    let fetcher = fetcher(&server, PersistedState::default()).await;
    let text = "https://github.com/a/b\nhttps://github.com/a/b/issues";

    let badges = DocumentRenderer::new(&fetcher).refresh(text, &mut ()).await;

    assert_eq!(badges.len(), 2);
    assert!(badges.iter().all(|b| b.stars == Some(50)));
    assert_eq!(fetcher.cache().len(), 1);
}

#[tokio::test]
async fn test_document_without_repositories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server, PersistedState::default()).await;
    let mut sink = RecordingSink::default();
    let badges = DocumentRenderer::new(&fetcher)
        .refresh("see https://example.com and https://github.com/", &mut sink)
        .await;

    assert!(badges.is_empty());
    assert!(sink.placeholders.is_empty());
}
