//! SQLite-backed page cache.

use super::traits::PageCache;
use crate::error::{ExplorerError, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// SQLite-based page cache.
///
/// A single `pages` table keyed by cache key. Writes use
/// `INSERT OR REPLACE`, so the most recent render always wins.
/// Thread-safe via internal mutex on the connection.
pub struct SqliteCache {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCache {
    /// Open (or create) a cache database at the given path.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ExplorerError::io_with_path(e, parent))?;
            }
        }

        let conn = Connection::open(db_path).map_err(|e| ExplorerError::Database {
            message: format!("Failed to open cache database: {}", e),
            source: Some(e),
        })?;

        // WAL lets readers proceed while a page is being written
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| ExplorerError::Database {
                message: format!("Failed to set pragmas: {}", e),
                source: Some(e),
            })?;

        Self::from_connection(conn)
    }

    /// Create a cache backed by a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let cache = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        cache.init_schema()?;
        Ok(cache)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS pages (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                size_bytes INTEGER NOT NULL,
                cached_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| ExplorerError::Database {
            message: format!("Failed to initialize cache schema: {}", e),
            source: Some(e),
        })?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| ExplorerError::Cache {
            message: format!("Failed to lock database: {}", e),
        })
    }

    /// When a key was last written, as RFC 3339.
    pub fn cached_at(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let cached_at = conn
            .query_row(
                "SELECT cached_at FROM pages WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(cached_at)
    }
}

impl PageCache for SqliteCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT value FROM pages WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| ExplorerError::Database {
            message: format!("Failed to query page {}: {}", key, e),
            source: Some(e),
        })
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT OR REPLACE INTO pages (key, value, size_bytes, cached_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![key, value, value.len() as i64, now],
        )
        .map_err(|e| ExplorerError::Database {
            message: format!("Failed to store page {}: {}", key, e),
            source: Some(e),
        })?;

        debug!("Stored page {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM pages WHERE key = ?1", params![key])?;
        Ok(deleted > 0)
    }

    fn len(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM pages", [])?;
        debug!("Cleared all cached pages");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
