//! Page cache trait and the cache gateway.

use crate::error::Result;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, error, warn};

/// Key/value store for rendered pages.
///
/// Keys come from [`crate::urls::cache_key`]; values are complete HTML
/// documents. There is no TTL: a `put` replaces whatever was stored.
pub trait PageCache: Send + Sync {
    /// Get a stored page, or `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a page, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Returns whether anything was removed.
    fn invalidate(&self, key: &str) -> Result<bool>;

    /// Number of stored pages.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove every stored page.
    fn clear(&self) -> Result<()>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}

/// Outcome of a cache write, as reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheWrite {
    Stored,
    Failed,
}

/// Read/write front for a [`PageCache`] backend.
///
/// Backend calls run on the blocking pool so SQLite I/O stays off the
/// async workers. Reads never fail: a backend error is logged and treated
/// as a miss. Writes complete before returning and report failure instead
/// of raising.
#[derive(Clone)]
pub struct CacheGateway {
    backend: Arc<dyn PageCache>,
}

impl CacheGateway {
    pub fn new(backend: Arc<dyn PageCache>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn PageCache> {
        &self.backend
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let backend = Arc::clone(&self.backend);
        let owned_key = key.to_string();
        let result = task::spawn_blocking(move || backend.get(&owned_key)).await;

        match result {
            Ok(Ok(Some(page))) => {
                debug!("Cache hit for {} ({})", key, self.backend.backend_name());
                Some(page)
            }
            Ok(Ok(None)) => None,
            Ok(Err(e)) => {
                warn!("Cache read failed for {}: {}", key, e);
                None
            }
            Err(e) => {
                warn!("Cache read task failed for {}: {}", key, e);
                None
            }
        }
    }

    pub async fn put(&self, key: &str, page: &str) -> CacheWrite {
        let backend = Arc::clone(&self.backend);
        let owned_key = key.to_string();
        let page = page.to_string();
        let result = task::spawn_blocking(move || backend.put(&owned_key, &page)).await;

        match result {
            Ok(Ok(())) => CacheWrite::Stored,
            Ok(Err(e)) => {
                error!("Cache write failed for {}: {}", key, e);
                CacheWrite::Failed
            }
            Err(e) => {
                error!("Cache write task failed for {}: {}", key, e);
                CacheWrite::Failed
            }
        }
    }
}

impl std::fmt::Debug for CacheGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheGateway")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}
