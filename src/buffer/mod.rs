//! Index page caching.
//!
//! The page cache is the in-memory layer between the navigator and the
//! index file. It holds every page visited in a session, parsed once.
//!
//! # Components
//! - [`PageCache`] - Offset-keyed arena of parsed pages
//! - [`PageCacheStats`] - Hit, miss and read counters

mod page_cache;
mod stats;

pub use page_cache::PageCache;
pub use stats::{PageCacheStats, StatsSnapshot};
