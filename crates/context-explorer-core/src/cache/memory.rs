//! In-process page cache.

use super::traits::PageCache;
use crate::config::CacheSettings;
use crate::error::Result;
use mini_moka::sync::Cache;

/// Capacity-bounded in-memory page cache with no expiry.
///
/// Pages live until evicted by capacity pressure or process exit.
#[derive(Clone)]
pub struct MemoryCache {
    pages: Cache<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_capacity(CacheSettings::MEMORY_MAX_PAGES)
    }

    pub fn with_capacity(max_pages: u64) -> Self {
        Self {
            pages: Cache::builder().max_capacity(max_pages).build(),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.pages.get(&key.to_string()))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.pages.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        let existed = self.pages.contains_key(&key);
        self.pages.invalidate(&key);
        Ok(existed)
    }

    fn len(&self) -> Result<usize> {
        Ok(self.pages.iter().count())
    }

    fn clear(&self) -> Result<()> {
        self.pages.invalidate_all();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
