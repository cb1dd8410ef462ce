//! Page Cache - the arena of parsed index pages.
//!
//! The [`PageCache`] provides:
//! - One parsed copy per page offset for the whole session
//! - Parent links recorded on first visit
//! - Explicit reset (no eviction)

use std::collections::HashMap;
use std::sync::atomic::Ordering;

use log::debug;

use crate::buffer::PageCacheStats;
use crate::common::config::IndexConfig;
use crate::common::{Error, PageOffset, Result};
use crate::storage::page::{IndexPage, IndexRoot};
use crate::storage::DiskManager;

/// Caches parsed index pages by offset.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────┐
/// │                       PageCache                          │
/// │  ┌───────────────────────┐   ┌───────────────────────┐   │
/// │  │ pages                 │   │ root: IndexRoot       │   │
/// │  │ PageOffset → IndexPage│   │ (re-read on reset)    │   │
/// │  └───────────────────────┘   └───────────────────────┘   │
/// │  ┌───────────────────────┐   ┌───────────────────────┐   │
/// │  │ disk: DiskManager     │   │ stats                 │   │
/// │  └───────────────────────┘   └───────────────────────┘   │
/// └──────────────────────────────────────────────────────────┘
/// ```
///
/// Pages never leave the cache during a session, so a parent recorded on
/// the way down is still there on the way back up. The cache grows with
/// the number of distinct pages visited until [`reset`](Self::reset).
pub struct PageCache {
    /// Parsed pages keyed by file offset.
    pages: HashMap<PageOffset, IndexPage>,

    /// Validated header of the index file.
    root: IndexRoot,

    /// Handles all disk I/O.
    disk: DiskManager,

    /// Options the header was validated with.
    config: IndexConfig,

    /// Performance statistics.
    stats: PageCacheStats,
}

impl PageCache {
    /// Create a cache over `disk`, loading the header page.
    ///
    /// # Errors
    /// `Error::CorruptIndex` if the header fails validation.
    pub fn new(mut disk: DiskManager, config: IndexConfig) -> Result<Self> {
        let root = disk.read_root(&config)?;
        debug!(
            "index {}: root {}, key size {}, expression '{}'",
            disk.name(),
            root.root,
            root.key_size,
            root.key_expr
        );

        Ok(Self {
            pages: HashMap::new(),
            root,
            disk,
            config,
            stats: PageCacheStats::new(),
        })
    }

    // ========================================================================
    // Public API: Fetch pages
    // ========================================================================

    /// Return the page at `offset`, reading it if this is the first visit.
    ///
    /// `parent` is recorded only when the page is read; a cached page keeps
    /// the parent from its first visit.
    pub fn get_cached_or_fetch(
        &mut self,
        offset: PageOffset,
        parent: PageOffset,
    ) -> Result<&IndexPage> {
        if self.pages.contains_key(&offset) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return self.lookup(offset, "get_page");
        }

        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);
        self.fetch_page(offset, parent)
    }

    /// Return a page that must already be cached.
    ///
    /// Used when climbing back up: every ancestor of the current page was
    /// cached on the way down. Not counted in the statistics.
    ///
    /// # Errors
    /// `Error::NotFound` if the page was never visited.
    pub fn get_cached_required(&self, offset: PageOffset) -> Result<&IndexPage> {
        self.lookup(offset, "get_cached_page")
    }

    /// Read the page at `offset` from disk and cache it.
    ///
    /// # Errors
    /// - `Error::CorruptIndex` if `offset` is unaligned or the page is malformed
    /// - `Error::Io` on a short read
    pub fn fetch_page(&mut self, offset: PageOffset, parent: PageOffset) -> Result<&IndexPage> {
        let raw = self.disk.read_page(offset)?;
        self.stats.pages_read.fetch_add(1, Ordering::Relaxed);

        let page = IndexPage::parse(&raw, offset, parent, &self.root, self.disk.name())?;
        debug!(
            "fetched {} (parent {}, {} entries)",
            offset,
            parent,
            page.entries()
        );

        self.pages.insert(offset, page);
        self.lookup(offset, "fetch_page")
    }

    /// Drop every cached page and re-read the header from disk.
    pub fn reset(&mut self) -> Result<()> {
        debug!("resetting page cache ({} pages)", self.pages.len());
        self.pages.clear();
        self.root = self.disk.read_root(&self.config)?;
        self.stats.resets.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Header of the index file.
    pub fn root(&self) -> &IndexRoot {
        &self.root
    }

    /// Index file name as used in error messages.
    pub fn name(&self) -> &str {
        self.disk.name()
    }

    /// Get page cache statistics.
    pub fn stats(&self) -> &PageCacheStats {
        &self.stats
    }

    /// Number of tree pages in the file; no root-to-leaf path is longer.
    pub fn tree_pages(&self) -> usize {
        self.disk.page_count().saturating_sub(1) as usize
    }

    /// Number of cached pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Check whether `offset` is cached.
    pub fn contains(&self, offset: PageOffset) -> bool {
        self.pages.contains_key(&offset)
    }

    fn lookup(&self, offset: PageOffset, op: &'static str) -> Result<&IndexPage> {
        self.pages.get(&offset).ok_or_else(|| Error::NotFound {
            file: self.disk.name().to_owned(),
            op,
            offset: offset.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    use crate::common::config::PAGE_SIZE;

    const KEY_SIZE: usize = 2;

    /// Header plus a root at 1024 with one separator over leaves at 2048 and 3072.
    fn write_index(path: &std::path::Path) {
        let mut bytes = vec![0u8; 4 * PAGE_SIZE];
        bytes[0..2].copy_from_slice(&6u16.to_le_bytes());
        bytes[4..8].copy_from_slice(&1024u32.to_le_bytes());
        bytes[12..14].copy_from_slice(&((KEY_SIZE + 8) as u16).to_le_bytes());
        bytes[14..16].copy_from_slice(&(KEY_SIZE as u16).to_le_bytes());
        bytes[18..20].copy_from_slice(&4u16.to_le_bytes());

        let mut page = |at: usize, items: &[(u32, u32, &[u8])], upper: u32| {
            let data = &mut bytes[at..at + PAGE_SIZE];
            data[0..2].copy_from_slice(&(items.len() as u16).to_le_bytes());
            let all = items.iter().copied().chain(std::iter::once((upper, 0, &b"\0\0"[..])));
            for (slot, (child, rec, key)) in all.enumerate() {
                let pos = 12 + slot * 10;
                data[2 + 2 * slot..4 + 2 * slot].copy_from_slice(&(pos as u16).to_le_bytes());
                data[pos..pos + 4].copy_from_slice(&child.to_le_bytes());
                data[pos + 4..pos + 8].copy_from_slice(&rec.to_le_bytes());
                data[pos + 8..pos + 10].copy_from_slice(key);
            }
        };
        page(1024, &[(2048, 2, &b"BB"[..])], 3072);
        page(2048, &[(0, 1, &b"AA"[..])], 0);
        page(3072, &[(0, 3, &b"CC"[..])], 0);

        File::create(path).unwrap().write_all(&bytes).unwrap();
    }

    fn create_test_cache() -> (PageCache, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.ntx");
        write_index(&path);
        let disk = DiskManager::open(&path).unwrap();
        (PageCache::new(disk, IndexConfig::default()).unwrap(), dir)
    }

    #[test]
    fn test_fetch_records_parent() {
        let (mut cache, _dir) = create_test_cache();
        let root = cache.root().root;

        let page = cache.get_cached_or_fetch(root, PageOffset::NONE).unwrap();
        assert_eq!(page.entries(), 1);
        let child = page.child(0);

        let leaf = cache.get_cached_or_fetch(child, root).unwrap();
        assert_eq!(leaf.parent(), root);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_hit_skips_disk() {
        let (mut cache, _dir) = create_test_cache();

        cache.get_cached_or_fetch(PageOffset::new(1024), PageOffset::NONE).unwrap();
        cache.get_cached_or_fetch(PageOffset::new(1024), PageOffset::NONE).unwrap();
        cache.get_cached_or_fetch(PageOffset::new(1024), PageOffset::NONE).unwrap();

        let snapshot = cache.stats().snapshot();
        assert_eq!(snapshot.pages_read, 1);
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.cache_hits, 2);
    }

    #[test]
    fn test_parent_fixed_on_first_visit() {
        let (mut cache, _dir) = create_test_cache();

        cache.get_cached_or_fetch(PageOffset::new(2048), PageOffset::new(1024)).unwrap();
        let page = cache
            .get_cached_or_fetch(PageOffset::new(2048), PageOffset::new(3072))
            .unwrap();
        assert_eq!(page.parent(), PageOffset::new(1024));
    }

    #[test]
    fn test_required_lookup_not_counted() {
        let (mut cache, _dir) = create_test_cache();
        cache.get_cached_or_fetch(PageOffset::new(1024), PageOffset::NONE).unwrap();

        cache.get_cached_required(PageOffset::new(1024)).unwrap();
        cache.get_cached_required(PageOffset::new(1024)).unwrap();

        let snapshot = cache.stats().snapshot();
        assert_eq!(snapshot.cache_hits, 0);
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(cache.tree_pages(), 3);
    }

    #[test]
    fn test_required_page_missing() {
        let (cache, _dir) = create_test_cache();

        match cache.get_cached_required(PageOffset::new(2048)) {
            Err(Error::NotFound { offset, .. }) => assert_eq!(offset, 2048),
            _ => panic!("Expected NotFound"),
        }
    }

    #[test]
    fn test_unaligned_fetch() {
        let (mut cache, _dir) = create_test_cache();
        let err = cache
            .get_cached_or_fetch(PageOffset::new(1500), PageOffset::NONE)
            .unwrap_err();
        assert!(err.is_corrupt_index());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_reset_clears_pages() {
        let (mut cache, _dir) = create_test_cache();
        cache.get_cached_or_fetch(PageOffset::new(1024), PageOffset::NONE).unwrap();
        assert!(cache.contains(PageOffset::new(1024)));

        cache.reset().unwrap();

        assert!(cache.is_empty());
        assert_eq!(cache.stats().snapshot().resets, 1);

        cache.get_cached_or_fetch(PageOffset::new(1024), PageOffset::NONE).unwrap();
        assert_eq!(cache.stats().snapshot().pages_read, 2);
    }
}
