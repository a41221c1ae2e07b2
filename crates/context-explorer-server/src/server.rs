//! HTTP server implementation using Axum.

use crate::handler::{handle_client_check, handle_health, handle_page};
use axum::{routing::get, Router};
use context_explorer::ContextExplorer;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Application state shared across handlers.
pub struct AppState {
    pub explorer: ContextExplorer,
}

/// Build the router.
///
/// Fixed routes are matched first; every other path is treated as
/// `/{owner}/{repo}/{page?}/{branch?}`.
pub fn build_router(explorer: ContextExplorer, max_concurrent_requests: usize) -> Router {
    let state = Arc::new(AppState { explorer });

    Router::new()
        .route("/health", get(handle_health))
        .route("/client-check", get(handle_client_check))
        .fallback(handle_page)
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent_requests.max(1)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(
    explorer: ContextExplorer,
    host: &str,
    port: u16,
    max_concurrent_requests: usize,
) -> anyhow::Result<SocketAddr> {
    let app = build_router(explorer, max_concurrent_requests);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use context_explorer::{ExplorerConfig, MemoryCache, PageCache};
    use mockito::{Matcher, Server, ServerGuard};
    use std::time::Duration;

    async fn start_with_upstream(server: &ServerGuard) -> SocketAddr {
        start_with_cache(server, Arc::new(MemoryCache::new())).await
    }

    async fn start_with_cache(server: &ServerGuard, cache: Arc<dyn PageCache>) -> SocketAddr {
        let config = ExplorerConfig::default()
            .with_manifest_base_url(server.url())
            .with_retrieval_base_url(server.url())
            .with_retrieval_token("test-token")
            .with_request_timeout(Duration::from_secs(5));
        let explorer = ContextExplorer::new(&config, cache).unwrap();
        start_server(explorer, "127.0.0.1", 0, 16).await.unwrap()
    }

    async fn get(addr: SocketAddr, path: &str) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("http://{}{}", addr, path))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .unwrap()
    }

    fn header<'a>(response: &'a reqwest::Response, name: &str) -> Option<&'a str> {
        response.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_server_starts() {
        let server = Server::new_async().await;
        let addr = start_with_upstream(&server).await;
        assert!(addr.port() > 0);

        let response = get(addr, "/health").await;
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_page_is_cached_between_requests() {
        let mut server = Server::new_async().await;
        let manifest = server
            .mock("GET", "/o/r/refs/heads/main/context.json")
            .with_status(200)
            .with_body(r#"{"context":{"x":{"summary":"S"}}}"#)
            .expect(1)
            .create_async()
            .await;
        server
            .mock("GET", "/o/r/tree/main")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let addr = start_with_upstream(&server).await;

        let first = get(addr, "/o/r").await;
        assert_eq!(first.status(), 200);
        assert_eq!(header(&first, "x-cache"), Some("miss"));
        assert!(header(&first, "content-type").unwrap().starts_with("text/html"));
        let first_body = first.text().await.unwrap();

        let second = get(addr, "/o/r").await;
        assert_eq!(header(&second, "x-cache"), Some("hit"));
        assert_eq!(second.text().await.unwrap(), first_body);

        manifest.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_query_regenerates() {
        let mut server = Server::new_async().await;
        let manifest = server
            .mock("GET", "/o/r/refs/heads/dev/context.json")
            .with_status(200)
            .with_body(r#"{"context":{}}"#)
            .expect(1)
            .create_async()
            .await;

        let cache = Arc::new(MemoryCache::new());
        cache.put("o/r/tree/dev", "<html>old</html>").unwrap();
        let addr = start_with_cache(&server, cache.clone()).await;

        let response = get(addr, "/o/r/tree/dev?refresh").await;
        assert_eq!(response.status(), 200);
        assert_eq!(header(&response, "x-cache"), Some("refresh"));
        assert!(response.text().await.unwrap().contains("Found 0 contexts"));
        assert_ne!(cache.get("o/r/tree/dev").unwrap().as_deref(), Some("<html>old</html>"));

        manifest.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_manifest_is_404() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/o/r/refs/heads/main/context.json")
            .with_status(404)
            .create_async()
            .await;

        let addr = start_with_upstream(&server).await;
        let response = get(addr, "/o/r").await;
        assert_eq!(response.status(), 404);
        assert_eq!(
            response.text().await.unwrap(),
            format!("Context file not found at {}/o/r/refs/heads/main/context.json", server.url())
        );
    }

    #[tokio::test]
    async fn test_malformed_manifest_is_400() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/o/r/refs/heads/main/context.json")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let addr = start_with_upstream(&server).await;
        let response = get(addr, "/o/r").await;
        assert_eq!(response.status(), 400);
        assert!(response
            .text()
            .await
            .unwrap()
            .starts_with("Error parsing context.json file:"));
    }

    #[tokio::test]
    async fn test_schema_warning_is_200() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/o/r/refs/heads/main/context.json")
            .with_status(200)
            .with_body(r#"{"notContext": {}}"#)
            .create_async()
            .await;

        let addr = start_with_upstream(&server).await;
        let response = get(addr, "/o/r").await;
        assert_eq!(response.status(), 200);
        let body = response.text().await.unwrap();
        assert!(body.contains(r#"<div class="warning">"#));
        assert!(body.contains("Found 0 contexts"));
    }

    #[tokio::test]
    async fn test_unreachable_manifest_host_is_502() {
        let config = ExplorerConfig::default()
            .with_manifest_base_url("http://127.0.0.1:1")
            .with_request_timeout(Duration::from_secs(5));
        let explorer = ContextExplorer::new(&config, Arc::new(MemoryCache::new())).unwrap();
        let addr = start_server(explorer, "127.0.0.1", 0, 16).await.unwrap();

        let response = get(addr, "/o/r").await;
        assert_eq!(response.status(), 502);
        assert!(header(&response, "content-type")
            .unwrap()
            .starts_with("text/plain"));
        assert!(response.text().await.unwrap().starts_with("Network error:"));
    }

    #[tokio::test]
    async fn test_short_path_is_400() {
        let server = Server::new_async().await;
        let addr = start_with_upstream(&server).await;

        let response = get(addr, "/only-owner").await;
        assert_eq!(response.status(), 400);
        assert!(response.text().await.unwrap().starts_with("Expected path"));
    }

    #[tokio::test]
    async fn test_client_check() {
        let server = Server::new_async().await;
        let addr = start_with_upstream(&server).await;
        let client = reqwest::Client::new();

        let editor = client
            .get(format!("http://{}/client-check", addr))
            .header("user-agent", "Visual Studio Code (desktop)")
            .send()
            .await
            .unwrap();
        assert_eq!(editor.text().await.unwrap(), "true");

        let browser = client
            .get(format!("http://{}/client-check", addr))
            .header("user-agent", "Mozilla/5.0")
            .send()
            .await
            .unwrap();
        assert_eq!(browser.text().await.unwrap(), "false");
    }
}
