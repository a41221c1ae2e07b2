//! Page cache abstraction for Context Explorer.
//!
//! Rendered pages are stored whole under an `owner/repo/tree/branch` key.
//! Two backends are provided:
//! - `SqliteCache`: persistent, shared across restarts
//! - `MemoryCache`: in-process, capacity bounded

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;
pub use traits::{CacheGateway, CacheWrite, PageCache};
