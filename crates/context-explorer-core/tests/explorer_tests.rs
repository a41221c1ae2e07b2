//! Integration tests for the ContextExplorer page pipeline.
//!
//! Both upstreams (raw manifest host and retrieval service) are mocked with
//! mockito so the full cache → fetch → enrich → render → store flow runs
//! against real HTTP.

use context_explorer::{
    CacheStatus, CacheWrite, ContextExplorer, ExplorerConfig, ExplorerError, MemoryCache,
    PageCache, PageRequest, SqliteCache, SCHEMA_WARNING,
};
use mockito::{Matcher, Server, ServerGuard};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Create an explorer whose upstreams both point at the mock server.
fn create_explorer(server: &ServerGuard, cache: Arc<dyn PageCache>) -> ContextExplorer {
    let config = ExplorerConfig::default()
        .with_manifest_base_url(server.url())
        .with_retrieval_base_url(server.url())
        .with_retrieval_token("test-token")
        .with_request_timeout(Duration::from_secs(5));
    ContextExplorer::new(&config, cache).expect("Failed to create explorer")
}

async fn mock_manifest(server: &mut ServerGuard, branch: &str, status: usize, body: &str) -> mockito::Mock {
    server
        .mock("GET", format!("/o/r/refs/heads/{}/context.json", branch).as_str())
        .with_status(status)
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn test_single_entry_scenario() {
    let mut server = Server::new_async().await;
    mock_manifest(&mut server, "main", 200, r#"{"context":{"x":{"summary":"S"}}}"#).await;
    server
        .mock("GET", "/o/r/tree/main")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_body("hello")
        .create_async()
        .await;

    let explorer = create_explorer(&server, Arc::new(MemoryCache::new()));
    let page = explorer.generate(&PageRequest::new("o", "r")).await.unwrap();

    assert_eq!(page.entries.len(), 1);
    let x = &page.entries[0];
    assert_eq!(x.slug, "x");
    assert_eq!(x.token_count, Some(1));
    assert!(x.error.is_none());
    assert!(x.prompt_url.is_none());
    assert!(page.warning.is_none());
    assert!(page.html.contains("Found 1 context in this repository"));
}

#[tokio::test]
async fn test_manifest_not_found() {
    let mut server = Server::new_async().await;
    mock_manifest(&mut server, "main", 404, "404: Not Found").await;

    let explorer = create_explorer(&server, Arc::new(MemoryCache::new()));
    let err = explorer
        .serve(&PageRequest::new("o", "r"), false)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 404);
    assert_eq!(
        err.to_string(),
        format!("Context file not found at {}/o/r/refs/heads/main/context.json", server.url())
    );
}

#[tokio::test]
async fn test_manifest_not_json() {
    let mut server = Server::new_async().await;
    mock_manifest(&mut server, "main", 200, "not json").await;

    let cache = Arc::new(MemoryCache::new());
    let explorer = create_explorer(&server, cache.clone());
    let err = explorer
        .serve(&PageRequest::new("o", "r"), false)
        .await
        .unwrap_err();

    assert!(matches!(err, ExplorerError::ManifestParse { .. }));
    assert_eq!(err.status_code(), 400);
    assert!(err.to_string().starts_with("Error parsing context.json file:"));
    assert!(cache.get("o/r/tree/main").unwrap().is_none());
}

#[tokio::test]
async fn test_schema_warning_renders_banner() {
    let mut server = Server::new_async().await;
    mock_manifest(&mut server, "main", 200, r#"{"notContext": {}}"#).await;

    let explorer = create_explorer(&server, Arc::new(MemoryCache::new()));
    let page = explorer.generate(&PageRequest::new("o", "r")).await.unwrap();

    assert!(page.entries.is_empty());
    assert_eq!(page.warning.as_deref(), Some(SCHEMA_WARNING));
    assert!(page.html.contains(r#"<div class="warning">"#));
    assert!(page.html.contains("Found 0 contexts"));
}

#[tokio::test]
async fn test_second_request_is_served_from_cache() {
    let mut server = Server::new_async().await;
    let manifest = server
        .mock("GET", "/o/r/refs/heads/main/context.json")
        .with_status(200)
        .with_body(r#"{"context":{"a":{"summary":"A","prompt":"Go"},"b":{"summary":"B"}}}"#)
        .expect(1)
        .create_async()
        .await;
    let retrieval = server
        .mock("GET", "/o/r/tree/main")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("some extracted content")
        .expect(2)
        .create_async()
        .await;

    let explorer = create_explorer(&server, Arc::new(MemoryCache::new()));
    let request = PageRequest::new("o", "r");

    let first = explorer.serve(&request, false).await.unwrap();
    let second = explorer.serve(&request, false).await.unwrap();

    assert_eq!(first.cache, CacheStatus::Miss);
    assert_eq!(first.write, Some(CacheWrite::Stored));
    assert_eq!(second.cache, CacheStatus::Hit);
    assert!(second.write.is_none());
    assert_eq!(first.html, second.html);

    manifest.assert_async().await;
    retrieval.assert_async().await;
}

#[tokio::test]
async fn test_refresh_bypasses_and_overwrites_cache() {
    let mut server = Server::new_async().await;
    mock_manifest(&mut server, "dev", 200, r#"{"context":{"fresh":{"summary":"Fresh"}}}"#).await;
    server
        .mock("GET", "/o/r/tree/main")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("new")
        .create_async()
        .await;

    let cache = Arc::new(MemoryCache::new());
    cache.put("o/r/tree/dev", "<html>stale</html>").unwrap();

    let explorer = create_explorer(&server, cache.clone());
    let request = PageRequest::new("o", "r").with_branch("dev");

    let cached = explorer.serve(&request, false).await.unwrap();
    assert_eq!(cached.html, "<html>stale</html>");

    let refreshed = explorer.serve(&request, true).await.unwrap();
    assert_eq!(refreshed.cache, CacheStatus::Refresh);
    assert!(refreshed.html.contains("Fresh"));
    assert_eq!(cache.get("o/r/tree/dev").unwrap(), Some(refreshed.html));
}

#[tokio::test]
async fn test_entry_failures_do_not_abort_page() {
    let mut server = Server::new_async().await;
    mock_manifest(
        &mut server,
        "main",
        200,
        r#"{"context":{"down":{"summary":"Down","basePath":["down"]},"up":{"summary":"Up","basePath":["up"]}}}"#,
    )
    .await;
    server
        .mock("GET", "/o/r/tree/main")
        .match_query(Matcher::UrlEncoded("basePath".into(), "down".into()))
        .with_status(503)
        .create_async()
        .await;
    server
        .mock("GET", "/o/r/tree/main")
        .match_query(Matcher::UrlEncoded("basePath".into(), "up".into()))
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let explorer = create_explorer(&server, Arc::new(MemoryCache::new()));
    let page = explorer.generate(&PageRequest::new("o", "r")).await.unwrap();

    assert_eq!(page.entries.len(), 2);
    assert_eq!(
        page.entries[0].error.as_deref(),
        Some("Failed to fetch from retrieval service: 503")
    );
    assert!(page.entries[1].error.is_none());
    assert!(page
        .html
        .contains("Error: Failed to fetch from retrieval service: 503"));
}

#[tokio::test]
async fn test_sqlite_cache_survives_new_explorer() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("pages.sqlite");

    let mut server = Server::new_async().await;
    let manifest = server
        .mock("GET", "/o/r/refs/heads/main/context.json")
        .with_status(200)
        .with_body(r#"{"context":{}}"#)
        .expect(1)
        .create_async()
        .await;

    let first = {
        let explorer = create_explorer(&server, Arc::new(SqliteCache::new(&db_path).unwrap()));
        explorer.serve(&PageRequest::new("o", "r"), false).await.unwrap()
    };

    let explorer = create_explorer(&server, Arc::new(SqliteCache::new(&db_path).unwrap()));
    let second = explorer.serve(&PageRequest::new("o", "r"), false).await.unwrap();

    assert_eq!(second.cache, CacheStatus::Hit);
    assert_eq!(first.html, second.html);
    manifest.assert_async().await;
}
