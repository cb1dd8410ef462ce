//! B-tree navigator - ordered traversal of an index file.
//!
//! The [`Navigator`] walks the index tree through the [`PageCache`]:
//! - [`top`](Navigator::top) / [`bottom`](Navigator::bottom) - first and last key
//! - [`next`](Navigator::next) / [`prev`](Navigator::prev) - neighbours of the current key
//! - [`find`](Navigator::find) - lower bound of a search key
//!
//! Pages carry no parent pointers on disk. Climbing back up relies on the
//! parent offset each cached page recorded when it was first reached, and
//! on locating the child's slot in that parent.

use std::cmp::Ordering;
use std::path::Path;

use log::{debug, warn};

use crate::buffer::{PageCache, PageCacheStats};
use crate::common::config::IndexConfig;
use crate::common::{Error, PageOffset, RecNo, Result};
use crate::storage::page::{IndexPage, IndexRoot};
use crate::storage::DiskManager;

use super::key;

/// Current place of the navigator: a page and a slot in it.
///
/// `index` runs over `0..=entries`; `index == entries` is the upper bound
/// slot, reached after stepping past the last item of a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub page: PageOffset,
    pub index: usize,
}

/// Result of [`Navigator::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found {
    /// Record of the key the navigator stopped on.
    pub rec_no: RecNo,
    /// Ordering of the search key relative to that key.
    ///
    /// `Less`: the search key sorts before it (nearest greater key).
    /// `Equal`: it starts with the search key.
    /// `Greater`: the search key sorts after every key (last key).
    pub ordering: Ordering,
}

impl Found {
    /// True when the key starts with the search key.
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.ordering == Ordering::Equal
    }
}

/// Direction a step moved in, for the order check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Walks one index file in key order.
///
/// # State
/// - `cache`: every page visited since open or the last reset
/// - `position`: page and slot of the current key
/// - `current_key`: the current key, checked against every new key so that
///   a damaged index surfaces as `CorruptIndex` instead of a wrong order
///
/// Record numbers come back as `Option<RecNo>`; `None` means there is no
/// record in that direction (empty index, past either end, or an item
/// holding record 0).
///
/// # Usage
/// ```ignore
/// let mut nav = Navigator::open("names.ntx")?;
/// let mut rec = nav.top()?;
/// while let Some(rec_no) = rec {
///     println!("{rec_no}");
///     rec = nav.next()?;
/// }
/// ```
pub struct Navigator {
    cache: PageCache,
    position: Option<Position>,
    current_key: Option<Box<[u8]>>,
}

impl Navigator {
    /// Open an index file with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, IndexConfig::default())
    }

    /// Open an index file.
    ///
    /// # Errors
    /// - `Error::Io` if the file cannot be opened or read
    /// - `Error::CorruptIndex` if the file shape or header is invalid
    pub fn open_with<P: AsRef<Path>>(path: P, config: IndexConfig) -> Result<Self> {
        let disk = DiskManager::open(path)?;
        Ok(Self::new(PageCache::new(disk, config)?))
    }

    /// Create a navigator over an already opened cache.
    pub fn new(cache: PageCache) -> Self {
        Self {
            cache,
            position: None,
            current_key: None,
        }
    }

    // ========================================================================
    // Public API: Navigation
    // ========================================================================

    /// Move to the smallest key.
    pub fn top(&mut self) -> Result<Option<RecNo>> {
        let mut parent = PageOffset::NONE;
        let mut next = self.root_offset();
        let mut depth = 1;

        loop {
            let page = self.cache.get_cached_or_fetch(next, parent)?;
            if page.is_empty() {
                self.position = None;
                return Ok(None);
            }
            let child = page.child(0);
            if !child.is_some() {
                break;
            }
            parent = next;
            next = child;
            depth += 1;
            self.check_depth("top", depth)?;
        }

        self.settle("top", next, 0, Some(Direction::Backward))
    }

    /// Move to the largest key.
    pub fn bottom(&mut self) -> Result<Option<RecNo>> {
        let mut parent = PageOffset::NONE;
        let mut next = self.root_offset();
        let mut depth = 1;

        let entries = loop {
            let page = self.cache.get_cached_or_fetch(next, parent)?;
            if page.is_empty() {
                self.position = None;
                return Ok(None);
            }
            let child = page.child(page.entries());
            if !child.is_some() {
                break page.entries();
            }
            parent = next;
            next = child;
            depth += 1;
            self.check_depth("bottom", depth)?;
        };

        self.settle("bottom", next, entries - 1, Some(Direction::Forward))
    }

    /// Move to the key following the current one.
    pub fn next(&mut self) -> Result<Option<RecNo>> {
        let Some(pos) = self.position else {
            return Ok(None);
        };

        let page = self.cache.get_cached_required(pos.page)?;
        if page.is_empty() {
            return Ok(None);
        }

        let entries = page.entries();
        let index = if pos.index < entries {
            pos.index + 1
        } else {
            pos.index
        };
        let child = page.child(index);

        // Common case: the next slot of a leaf.
        if index < entries && !child.is_some() {
            return self.settle("next", pos.page, index, Some(Direction::Forward));
        }

        self.position = Some(Position {
            page: pos.page,
            index,
        });
        if child.is_some() {
            self.next_down(child)
        } else {
            self.next_up()
        }
    }

    /// Move to the key preceding the current one.
    pub fn prev(&mut self) -> Result<Option<RecNo>> {
        let Some(pos) = self.position else {
            return Ok(None);
        };

        let page = self.cache.get_cached_required(pos.page)?;
        if page.is_empty() {
            return Ok(None);
        }

        let child = page.child(pos.index);
        if child.is_some() {
            self.prev_down(child)
        } else if pos.index > 0 {
            self.settle("prev", pos.page, pos.index - 1, Some(Direction::Backward))
        } else {
            self.prev_up()
        }
    }

    /// Move to the first key not smaller than `search`.
    ///
    /// `search` is cut to the key size; a shorter key is compared as a
    /// prefix. Among equal keys the first in index order is chosen. When
    /// every key is smaller, the navigator stops on the last key and
    /// reports `Ordering::Greater`.
    ///
    /// Returns `None` only for an empty index.
    pub fn find(&mut self, search: &[u8]) -> Result<Option<Found>> {
        let search = key::truncate(search, self.cache.root().key_len());
        self.current_key = None;

        let mut parent = PageOffset::NONE;
        let mut next = self.root_offset();
        let mut depth = 1;

        // Descend choosing the first slot that is not below the search key.
        let (leaf, index, ordering, entries) = loop {
            let page = self.cache.get_cached_or_fetch(next, parent)?;
            if page.is_empty() {
                self.position = None;
                return Ok(None);
            }
            let (index, ordering) = page.search(search);
            let child = page.child(index);
            if !child.is_some() {
                break (next, index, ordering, page.entries());
            }
            parent = next;
            next = child;
            depth += 1;
            self.check_depth("find", depth)?;
        };

        if index < entries {
            debug!("find: stopped in leaf {} slot {}", leaf, index);
            return self.found(leaf, index, ordering);
        }

        // The leaf holds only smaller keys. The answer is the separator
        // above the nearest ancestor slot that is not an upper bound.
        let mut current = leaf;
        loop {
            let parent = self.cache.get_cached_required(current)?.parent();
            if !parent.is_some() {
                debug!("find: search key is above every key");
                return self.found(leaf, entries - 1, Ordering::Greater);
            }
            let page = self.cache.get_cached_required(parent)?;
            let slot = self.slot_in_parent(page, current, "find")?;
            if let Some(item) = page.item(slot) {
                debug!("find: went up to {} slot {}", parent, slot);
                let ordering = key::compare(search, &item.key);
                return self.found(parent, slot, ordering);
            }
            current = parent;
        }
    }

    /// Drop the page cache and re-read the header.
    ///
    /// Afterwards there is no current key; position again with
    /// [`top`](Self::top), [`bottom`](Self::bottom) or [`find`](Self::find).
    pub fn reset(&mut self) -> Result<()> {
        self.position = None;
        self.current_key = None;
        self.cache.reset()
    }

    // ========================================================================
    // Public API: State and info
    // ========================================================================

    /// Key of the current item.
    pub fn current_key(&self) -> Option<&[u8]> {
        self.current_key.as_deref()
    }

    /// Current page and slot.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Header of the index file.
    pub fn root(&self) -> &IndexRoot {
        self.cache.root()
    }

    /// Declared key size in bytes.
    pub fn key_size(&self) -> usize {
        self.cache.root().key_len()
    }

    /// Expression the index was built from.
    pub fn key_expression(&self) -> &str {
        &self.cache.root().key_expr
    }

    /// Page cache statistics.
    pub fn stats(&self) -> &PageCacheStats {
        self.cache.stats()
    }

    /// Number of pages cached in this session.
    pub fn cached_pages(&self) -> usize {
        self.cache.len()
    }

    // ========================================================================
    // Internal: Multi-page steps
    // ========================================================================

    /// Leftmost key of the subtree at `start`.
    fn next_down(&mut self, start: PageOffset) -> Result<Option<RecNo>> {
        let mut parent = self.position.map_or(PageOffset::NONE, |pos| pos.page);
        let mut next = start;
        let mut depth = 1;

        loop {
            let page = self.cache.get_cached_or_fetch(next, parent)?;
            if page.is_empty() {
                return Ok(None);
            }
            let child = page.child(0);
            if !child.is_some() {
                break;
            }
            parent = next;
            next = child;
            depth += 1;
            self.check_depth("next_down", depth)?;
        }

        self.settle("next_down", next, 0, Some(Direction::Forward))
    }

    /// Separator above the subtree the current page closes.
    fn next_up(&mut self) -> Result<Option<RecNo>> {
        let Some(pos) = self.position else {
            return Ok(None);
        };

        let mut current = pos.page;
        loop {
            let parent = self.cache.get_cached_required(current)?.parent();
            if !parent.is_some() {
                debug!("next_up: passed the last key");
                return Ok(None);
            }
            let page = self.cache.get_cached_required(parent)?;
            if page.is_empty() {
                return Ok(None);
            }
            let slot = self.slot_in_parent(page, current, "next_up")?;
            if slot < page.entries() {
                return self.settle("next_up", parent, slot, Some(Direction::Forward));
            }
            current = parent;
        }
    }

    /// Rightmost key of the subtree at `start`.
    fn prev_down(&mut self, start: PageOffset) -> Result<Option<RecNo>> {
        let mut parent = self.position.map_or(PageOffset::NONE, |pos| pos.page);
        let mut next = start;
        let mut depth = 1;

        let entries = loop {
            let page = self.cache.get_cached_or_fetch(next, parent)?;
            if page.is_empty() {
                return Ok(None);
            }
            let child = page.child(page.entries());
            if !child.is_some() {
                break page.entries();
            }
            parent = next;
            next = child;
            depth += 1;
            self.check_depth("prev_down", depth)?;
        };

        self.settle("prev_down", next, entries - 1, Some(Direction::Backward))
    }

    /// Separator below the subtree the current page opens.
    fn prev_up(&mut self) -> Result<Option<RecNo>> {
        let Some(pos) = self.position else {
            return Ok(None);
        };

        let mut current = pos.page;
        loop {
            let parent = self.cache.get_cached_required(current)?.parent();
            if !parent.is_some() {
                debug!("prev_up: passed the first key");
                return Ok(None);
            }
            let page = self.cache.get_cached_required(parent)?;
            if page.is_empty() {
                return Ok(None);
            }
            let slot = self.slot_in_parent(page, current, "prev_up")?;
            if slot > 0 {
                return self.settle("prev_up", parent, slot - 1, Some(Direction::Backward));
            }
            current = parent;
        }
    }

    // ========================================================================
    // Internal: Helpers
    // ========================================================================

    fn root_offset(&self) -> PageOffset {
        self.cache.root().root
    }

    /// A root-to-leaf path visits each tree page once, so a descent deeper
    /// than the number of tree pages has met a link back up the tree.
    fn check_depth(&self, op: &'static str, depth: usize) -> Result<()> {
        if depth > self.cache.tree_pages() {
            warn!(
                "{}: {}: descent passed {} tree pages",
                self.cache.name(),
                op,
                self.cache.tree_pages()
            );
            return Err(Error::corrupt_index(self.cache.name(), op, "page cycle"));
        }
        Ok(())
    }

    /// Make item `index` of `page` current and return its record.
    ///
    /// With a direction, the new key is first checked against the current
    /// one: moving forward it must not be smaller, moving backward not
    /// larger.
    fn settle(
        &mut self,
        op: &'static str,
        page: PageOffset,
        index: usize,
        direction: Option<Direction>,
    ) -> Result<Option<RecNo>> {
        let item = self
            .cache
            .get_cached_required(page)?
            .item(index)
            .ok_or_else(|| {
                Error::corrupt_index(
                    self.cache.name(),
                    op,
                    format!("{page} has no item in slot {index}"),
                )
            })?;

        if let (Some(direction), Some(current)) = (direction, self.current_key.as_deref()) {
            let order = current.cmp(&item.key);
            let invalid = match direction {
                Direction::Forward => order == Ordering::Greater,
                Direction::Backward => order == Ordering::Less,
            };
            if invalid {
                warn!(
                    "{}: {}: key order violated at {} slot {}",
                    self.cache.name(),
                    op,
                    page,
                    index
                );
                return Err(Error::corrupt_index(self.cache.name(), op, "invalid order"));
            }
        }

        let rec_no = item.rec_no;
        self.current_key = Some(item.key.clone());
        self.position = Some(Position { page, index });

        // Record 0 marks an item without a record.
        Ok((rec_no != 0).then_some(rec_no))
    }

    fn found(&mut self, page: PageOffset, index: usize, ordering: Ordering) -> Result<Option<Found>> {
        Ok(self
            .settle("find", page, index, None)?
            .map(|rec_no| Found { rec_no, ordering }))
    }

    /// Slot of `parent` that links to `child`.
    fn slot_in_parent(&self, parent: &IndexPage, child: PageOffset, op: &'static str) -> Result<usize> {
        parent.find_child(child).ok_or_else(|| {
            Error::corrupt_index(
                self.cache.name(),
                op,
                format!("{child} is not linked from its parent {}", parent.offset()),
            )
        })
    }
}
