//! Parsed index tree page.

use std::cmp::Ordering;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageOffset, RecNo, Result};
use crate::index::key;

use super::index_root::{FieldWidth, IndexRoot};
use super::page::Page;

/// One key entry of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Subtree holding keys smaller than this one, or `NONE` in a leaf.
    pub child: PageOffset,
    /// Record the key belongs to.
    pub rec_no: RecNo,
    /// Key bytes, exactly `key_size` long.
    pub key: Box<[u8]>,
}

/// What lives in a slot of a page.
///
/// Slots `0..entries` hold items. Slot `entries` is the upper bound: it
/// only links to the subtree of keys greater than every key on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    Item(&'a Item),
    UpperBound(PageOffset),
}

impl Slot<'_> {
    /// Child link of the slot.
    #[inline]
    pub fn child(&self) -> PageOffset {
        match self {
            Slot::Item(item) => item.child,
            Slot::UpperBound(child) => *child,
        }
    }
}

/// A tree page as held in the page cache.
///
/// # Layout
/// ```text
/// ┌──────────┬─────────────────────────────┬─────────────────────────┐
/// │ entries  │ slot offsets [max_items+1]  │ items (any order)       │
/// │ u16      │ u16 each, in-page byte pos  │ child | rec_no | key    │
/// └──────────┴─────────────────────────────┴─────────────────────────┘
/// ```
///
/// `parent` is not stored on disk. It is the offset of the page this one
/// was first reached from during descent and stays fixed while cached.
#[derive(Debug, Clone)]
pub struct IndexPage {
    offset: PageOffset,
    parent: PageOffset,
    items: Vec<Item>,
    upper_bound: PageOffset,
}

impl IndexPage {
    /// Decode a raw page read from `offset`.
    ///
    /// # Errors
    /// `Error::CorruptIndex` if the entry count exceeds the header's
    /// maximum or a slot points outside the page.
    pub fn parse(
        page: &Page,
        offset: PageOffset,
        parent: PageOffset,
        root: &IndexRoot,
        file: &str,
    ) -> Result<Self> {
        const OP: &str = "fetch_page";

        let entries = page.u16_at(0) as usize;
        if entries > root.max_items as usize {
            return Err(Error::corrupt_index(
                file,
                OP,
                format!(
                    "{offset}: {entries} entries exceed maximum {}",
                    root.max_items
                ),
            ));
        }

        if entries == 0 {
            return Ok(Self {
                offset,
                parent,
                items: Vec::new(),
                upper_bound: PageOffset::NONE,
            });
        }

        let width = root.field_width.bytes();
        let item_size = root.item_size as usize;
        let slot_table_end = 2 + 2 * (root.max_items as usize + 1);

        let locate = |slot: usize| -> Result<usize> {
            let pos = page.u16_at(2 + 2 * slot) as usize;
            if pos < slot_table_end || pos + item_size > PAGE_SIZE {
                return Err(Error::corrupt_index(
                    file,
                    OP,
                    format!("{offset}: slot {slot} points outside the page ({pos})"),
                ));
            }
            Ok(pos)
        };

        let read_field = |pos: usize| -> u64 {
            match root.field_width {
                FieldWidth::Narrow => page.u32_at(pos) as u64,
                FieldWidth::Wide => page.u64_at(pos),
            }
        };

        let mut items = Vec::with_capacity(entries);
        for slot in 0..entries {
            let pos = locate(slot)?;
            items.push(Item {
                child: PageOffset::new(read_field(pos)),
                rec_no: read_field(pos + width),
                key: page.bytes_at(pos + 2 * width, root.key_len()).into(),
            });
        }
        let upper_bound = PageOffset::new(read_field(locate(entries)?));

        Ok(Self {
            offset,
            parent,
            items,
            upper_bound,
        })
    }

    /// Offset of this page in the file.
    #[inline]
    pub fn offset(&self) -> PageOffset {
        self.offset
    }

    /// Offset of the page this one was reached from (`NONE` for the root).
    #[inline]
    pub fn parent(&self) -> PageOffset {
        self.parent
    }

    /// Number of real items.
    #[inline]
    pub fn entries(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item in slot `index`, `None` for the upper bound or beyond.
    #[inline]
    pub fn item(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Content of slot `index`; anything past the items is the upper bound.
    #[inline]
    pub fn slot(&self, index: usize) -> Slot<'_> {
        match self.items.get(index) {
            Some(item) => Slot::Item(item),
            None => Slot::UpperBound(self.upper_bound),
        }
    }

    /// Child link of slot `index`.
    #[inline]
    pub fn child(&self, index: usize) -> PageOffset {
        self.slot(index).child()
    }

    /// Find the slot to follow for `search`.
    ///
    /// Returns the first slot whose key is not smaller than `search`
    /// (compared over the length of `search`) together with the ordering
    /// of `search` against that key. When every key is smaller the upper
    /// bound slot is returned with `Ordering::Greater`.
    pub fn search(&self, search: &[u8]) -> (usize, Ordering) {
        let index = self
            .items
            .partition_point(|item| key::compare(search, &item.key) == Ordering::Greater);

        match self.items.get(index) {
            Some(item) => (index, key::compare(search, &item.key)),
            None => (index, Ordering::Greater),
        }
    }

    /// Slot whose child link is `child`.
    pub fn find_child(&self, child: PageOffset) -> Option<usize> {
        (0..=self.entries()).find(|&index| self.child(index) == child)
    }
}

// ============================================================================
// TESTS
// ============================================================================
