//! Context Explorer - headless library for `context.json` manifests.
//!
//! Fetches a repository's `context.json`, resolves every entry against the
//! retrieval service, renders an HTML explorer page with a README markdown
//! snippet, and caches the page per `owner/repo/tree/branch`.
//!
//! # Example
//!
//! ```rust,ignore
//! use context_explorer::{ContextExplorer, ExplorerConfig, MemoryCache, PageRequest};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> context_explorer::Result<()> {
//!     let config = ExplorerConfig::default().with_retrieval_token("secret");
//!     let explorer = ContextExplorer::new(&config, Arc::new(MemoryCache::new()))?;
//!
//!     let page = explorer.serve(&PageRequest::new("owner", "repo"), false).await?;
//!     println!("{} bytes ({})", page.html.len(), page.cache.as_str());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod enrich;
pub mod error;
pub mod explorer;
pub mod manifest;
pub mod network;
pub mod render;
pub mod urls;

// Re-export commonly used types
pub use cache::{CacheGateway, CacheWrite, MemoryCache, PageCache, SqliteCache};
pub use config::{AppConfig, ExplorerConfig};
pub use enrich::{token_estimate, EnrichedEntry, Enricher};
pub use error::{ExplorerError, Result};
pub use explorer::{CacheStatus, ContextExplorer, GeneratedPage, PageRequest, ServedPage};
pub use manifest::{Entry, EntrySlot, Manifest, SCHEMA_WARNING};
pub use urls::cache_key;

/// Whether a `User-Agent` value identifies the desktop editor client.
pub fn is_editor_client(user_agent: Option<&str>) -> bool {
    user_agent == Some(AppConfig::EDITOR_CLIENT_ID)
}
