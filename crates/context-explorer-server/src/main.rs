//! Context Explorer server - HTML explorer for `context.json` manifests.
//!
//! Serves `GET /{owner}/{repo}/{page?}/{branch?}` backed by the
//! context-explorer library, with pages cached in memory or in SQLite.

mod handler;
mod server;

use anyhow::Result;
use clap::Parser;
use context_explorer::config::NetworkConfig;
use context_explorer::{ContextExplorer, ExplorerConfig, MemoryCache, PageCache, SqliteCache};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "context-explorer-server")]
#[command(about = "HTML explorer for context.json manifests")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "8787")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Bearer token for the retrieval service
    #[arg(long, env = "RETRIEVAL_TOKEN", hide_env_values = true, default_value = "")]
    retrieval_token: String,

    /// SQLite database for rendered pages (in-memory cache when omitted)
    #[arg(long)]
    cache_db: Option<PathBuf>,

    /// Raw-content host serving context.json files
    #[arg(long, default_value = NetworkConfig::MANIFEST_BASE_URL)]
    manifest_base_url: String,

    /// Retrieval service host
    #[arg(long, default_value = NetworkConfig::RETRIEVAL_BASE_URL)]
    retrieval_base_url: String,

    /// Timeout for each outbound request, in seconds
    #[arg(long, default_value = "15")]
    request_timeout_secs: u64,

    /// Concurrent retrieval calls per manifest
    #[arg(long, default_value_t = NetworkConfig::MAX_CONCURRENT_FETCHES)]
    max_concurrent_fetches: usize,

    /// Concurrent page requests served
    #[arg(long, default_value = "64")]
    max_concurrent_requests: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false);
    if args.json_logs {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    info!("Starting Context Explorer server");

    if args.retrieval_token.is_empty() {
        warn!("No retrieval token configured; retrieval calls will be unauthenticated");
    }

    let config = ExplorerConfig::default()
        .with_manifest_base_url(args.manifest_base_url)
        .with_retrieval_base_url(args.retrieval_base_url)
        .with_retrieval_token(args.retrieval_token)
        .with_request_timeout(Duration::from_secs(args.request_timeout_secs))
        .with_max_concurrent_fetches(args.max_concurrent_fetches);

    let cache: Arc<dyn PageCache> = match &args.cache_db {
        Some(path) => {
            info!("Page cache: {}", path.display());
            Arc::new(SqliteCache::new(path)?)
        }
        None => {
            info!("Page cache: in-memory");
            Arc::new(MemoryCache::new())
        }
    };

    let explorer = ContextExplorer::new(&config, cache)?;
    let addr =
        server::start_server(explorer, &args.host, args.port, args.max_concurrent_requests)
            .await?;

    info!("Context Explorer running on http://{}", addr);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
